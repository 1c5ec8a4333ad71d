//! Helpers shared by the reply parsers
//!
//! - [`xml_decode`]: decode one complete reply element into a small tree

pub mod xml_decode;

pub use xml_decode::{child_elements, element_text, parse_element};
