pub mod fetch;
pub mod home;
pub mod install;
pub mod paths;
pub mod run;
pub mod spec;
pub mod tarball;
pub mod target;
