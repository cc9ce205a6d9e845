/*!
 * Data Structures
 * Small value types shared across the bridge and the object model
 */

mod inline_string;

pub use inline_string::InlineString;
