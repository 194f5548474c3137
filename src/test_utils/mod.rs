//! Assertions shared by the handler tests.

#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{
    assert_field_error, assert_form_input, assert_form_submit_button, assert_has_field_error,
    assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::assert_hx_redirect;
