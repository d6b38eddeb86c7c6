// Catalog and cart
pub mod commerce;

// Accounts
pub mod users;

// Ordering
pub mod orders;
