//! Matcher strategies for the Easy-Apply surface.
//!
//! Each logical control is an ordered list; the first matcher that finds
//! an element wins.

use jobtrail_browser::Matcher;

/// Entry control on the listing page that opens the in-page flow.
pub const EASY_APPLY: &[Matcher] = &[
    Matcher::Css("button.jobs-apply-button[aria-label*='Easy Apply']"),
    Matcher::Text {
        selector: "button",
        text: "Easy Apply",
    },
];

/// Final submission control. Disabled buttons never match.
pub const SUBMIT: &[Matcher] = &[
    Matcher::Css("button[aria-label*='Submit application']:not([disabled])"),
    Matcher::Text {
        selector: "button:not([disabled])",
        text: "Submit application",
    },
];

/// Advances to the next step of the form.
pub const NEXT: &[Matcher] = &[
    Matcher::Css("button[aria-label*='Continue']:not([disabled])"),
    Matcher::Css("button[aria-label*='Review']:not([disabled])"),
    Matcher::Css("button[aria-label*='Next']:not([disabled])"),
    Matcher::Text {
        selector: "button:not([disabled])",
        text: "Next",
    },
    Matcher::Text {
        selector: "button:not([disabled])",
        text: "Review",
    },
];

pub const PHONE: &[Matcher] = &[
    Matcher::Css("input[id*='phoneNumber']"),
    Matcher::Css("input[name*='phone']"),
];

pub const CITY: &[Matcher] = &[
    Matcher::Css("input[id*='city']"),
    Matcher::Css("input[name*='city']"),
];

pub const RESUME_UPLOAD: &[Matcher] = &[Matcher::Css("input[type='file']")];

/// Inputs the form insists on. Values are checked separately.
pub const REQUIRED_FIELDS: &str = "input[required]:not([type='file']):not([type='hidden'])";
