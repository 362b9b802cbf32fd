// User domain module
// Identity record referenced (never owned) by profiles and projects

pub mod value_objects;

pub use value_objects::Email;
