//! Request extractors.

mod principal;
mod validated_form;

pub use principal::{AdminUser, CurrentUser};
pub use validated_form::ValidatedForm;
