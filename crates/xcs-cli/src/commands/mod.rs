pub mod check;
pub mod dispatch;
pub mod proposals;
pub mod register;
pub mod shared;
pub mod status;
pub mod sync;
pub mod transfer;
pub mod validate;
