use regex::Regex;

/// Create a regex that never matches anything.
///
/// Used as a fallback when a static pattern fails to compile, which keeps the
/// pipeline total instead of panicking at first use.
///
/// # Panics
///
/// Panics only if the impossible-class pattern itself fails to compile.
#[must_use]
pub(crate) fn never_matching_regex() -> Regex {
  #[allow(
    clippy::expect_used,
    reason = "the pattern asserts an impossible character class and is \
              guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("never-matching regex should always compile")
}
