pub mod blocklist;
pub mod danger;
pub mod document;
pub mod estree;
pub mod sanitize;

pub use blocklist::Blocklist;
pub use danger::{is_dangerous, Classifier, Finding, Rule};
pub use document::Node;
pub use estree::SyntaxNode;
pub use sanitize::{
    sanitize, AttributeScope, MissingTreePolicy, Mode, SanitizeOptions, SanitizeReport, Sanitizer,
};

#[cfg(test)]
mod fixtures;
