//! cfg 模块 - 基于类型名称的对象创建
//!
//! 通过 [`TypeOptions`] 描述要创建的实现和它的配置，
//! 由 [`register_trait`] 注册的构造函数完成创建

pub mod macros;
pub mod registry;
pub mod type_options;

pub use registry::{create_trait_from_type_options, register_trait};
pub use type_options::TypeOptions;
