//! List/filter/paginate/mutate building blocks shared by every list page.

use std::fmt::Debug;
use std::hash::Hash;

pub mod mutation;
pub mod pagination;
pub mod query;
pub mod refine;
pub mod view;

/// Rows with a stable identity inside a list.
pub trait Identified {
    type Id: Copy + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;
}
