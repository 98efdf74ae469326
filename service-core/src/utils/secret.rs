use subtle::ConstantTimeEq;

/// Compare a configured secret against a caller-supplied value in constant
/// time. Differing lengths fail without inspecting content.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let provided_bytes = provided.as_bytes();

    if expected_bytes.len() != provided_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(provided_bytes).into()
}
