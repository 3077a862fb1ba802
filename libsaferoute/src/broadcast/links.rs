//! Messaging and map link construction

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::LatLng;

/// Characters left unescaped: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a URI component the way browsers' `encodeURIComponent` does
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// WhatsApp share link with `message` prefilled
pub fn whatsapp_link(message: &str) -> String {
    format!("https://wa.me/?text={}", encode_component(message))
}

/// SMS compose link with `message` prefilled and no recipient
pub fn sms_link(message: &str) -> String {
    format!("sms:?body={}", encode_component(message))
}

/// Map search link for a coordinate
pub fn coordinate_link(maps_base: &str, position: LatLng) -> String {
    format!("{}?q={},{}", maps_base, position.lat, position.lon)
}

/// Map search link for free text
pub fn place_link(maps_base: &str, place: &str) -> String {
    format!("{}?q={}", maps_base, encode_component(place))
}
