use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_endpoint = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_endpoint, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_endpoint:?}"
    );
}

/// Assert that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();
    let input = form
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""));

    let input_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input with name {name} to have the required attribute but got none"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

/// Assert that the error message directly after the input with the ID
/// `field` is `want_error_message`.
#[track_caller]
pub(crate) fn assert_field_error(html: &Html, field: &str, want_error_message: &str) {
    let selector = Selector::parse(&format!("input#{field} + p.text-red-500.text-base")).unwrap();
    let error_message = html
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No error message found for {field}"))
        .text()
        .collect::<String>();

    assert_eq!(error_message.trim(), want_error_message);
}

/// Assert that the input with the ID `field` has an error message, whatever it says.
#[track_caller]
pub(crate) fn assert_has_field_error(html: &Html, field: &str) {
    let selector = Selector::parse(&format!("input#{field} + p.text-red-500.text-base")).unwrap();

    assert_eq!(
        html.select(&selector).count(),
        1,
        "want one error message for {field}"
    );
}
