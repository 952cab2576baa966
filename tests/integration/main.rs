//! Explorer scenarios driven through the public API against the in-memory
//! backend.

mod helpers;

mod delete_test;
mod navigation_test;
mod rename_test;
mod upload_test;
mod viewer_test;
