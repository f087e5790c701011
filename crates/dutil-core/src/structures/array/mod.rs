//! Dynamic arrays and pointer arrays

mod dyn_array;
mod ptr_array;

#[cfg(test)]
mod tests;

pub use dyn_array::DynArray;
pub use ptr_array::PtrArray;
