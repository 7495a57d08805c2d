pub mod buffer3;
pub mod parallel;
pub mod shared_fn;

pub use buffer3::Buffer3;
pub use shared_fn::SharedFn;
