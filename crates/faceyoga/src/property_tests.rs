//! Property-based tests for faceyoga
//!
//! Random inputs for the pure pieces: default profiles, upload validation,
//! practice-time formatting and backend error classification.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::error::Error;
    use crate::resources::storage::{IMAGE_EXTENSIONS, image_extension};
    use crate::types::{NewProfile, User, format_practice_time};

    // ===== Strategy Generators =====

    fn arb_local_part() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9._+-]{0,20}"
    }

    fn arb_domain() -> impl Strategy<Value = String> {
        "[a-z]{1,10}\\.(com|org|app)"
    }

    fn arb_mixed_case(ext: &'static str) -> impl Strategy<Value = String> {
        proptest::collection::vec(any::<bool>(), ext.len()).prop_map(move |upper| {
            ext.chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        /// Default profiles take the username from the email's local part
        /// and start with zeroed counters.
        #[test]
        fn prop_default_profile_username(local in arb_local_part(), domain in arb_domain()) {
            let user = User {
                id: "u-1".to_string(),
                email: Some(format!("{local}@{domain}")),
                created_at: None,
                user_metadata: serde_json::Value::Null,
            };

            let profile = NewProfile::default_for(&user).unwrap();
            prop_assert_eq!(profile.username, local);
            prop_assert_eq!(profile.streak, 0);
            prop_assert_eq!(profile.exercises_done, 0);
            prop_assert_eq!(profile.practice_time, 0.0);
        }

        /// Accepted image extensions match regardless of case.
        #[test]
        fn prop_image_extension_case_insensitive(
            stem in "[a-zA-Z0-9_-]{1,20}",
            ext in prop::sample::select(IMAGE_EXTENSIONS.to_vec()).prop_flat_map(arb_mixed_case),
        ) {
            let accepted = image_extension(&format!("{stem}.{ext}")).unwrap();
            prop_assert_eq!(accepted, ext.to_ascii_lowercase());
        }

        /// Anything outside the accepted set is a validation failure.
        #[test]
        fn prop_other_extensions_rejected(stem in "[a-z]{1,10}", ext in "[a-z]{1,5}") {
            prop_assume!(!IMAGE_EXTENSIONS.contains(&ext.as_str()));
            let is_invalid = matches!(
                image_extension(&format!("{stem}.{ext}")),
                Err(Error::InvalidRequest(_))
            );
            prop_assert!(is_invalid);
        }

        /// Under an hour is shown in minutes, otherwise in hours.
        #[test]
        fn prop_practice_time_unit(hours in 0.0f64..500.0) {
            let formatted = format_practice_time(hours);
            if hours < 1.0 {
                prop_assert!(formatted.ends_with(" mins"));
            } else {
                prop_assert!(formatted.ends_with(" hrs"));
            }
        }

        /// Server-side failures are retryable, client-side ones are not.
        #[test]
        fn prop_status_retry_classification(status in 400u16..600) {
            let err = Error::from_response(status, "{}", &http::HeaderMap::new());
            let expected = status >= 500 || status == 408 || status == 429;
            prop_assert_eq!(err.is_retryable(), expected);
        }
    }
}
