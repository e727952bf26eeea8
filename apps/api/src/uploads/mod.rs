// Resume and profile-image uploads. Files are validated before anything is
// written to blob storage; the profile keeps only the resulting URL.

pub mod blob;
pub mod handlers;
pub mod validation;
