//! 简化 From 实现的宏
//!
//! 注册到 [`register_trait`](crate::cfg::register_trait) 的类型需要
//! `T: From<Config>` 和 `Box<T>: Into<Box<dyn Trait>>`，这两个宏生成对应实现

/// 为配置类型实现到目标类型的 From
///
/// `impl_from!(ConfigType => Type)` 调用 `Type::new(config)`
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };
}

/// 实现 `Box<Type>` 到 `Box<dyn Trait>` 的转换
///
/// 用法：`impl_box_from!(Type => dyn TraitName)`
#[macro_export]
macro_rules! impl_box_from {
    ($source_type:ty => dyn $trait_name:path) => {
        impl From<Box<$source_type>> for Box<dyn $trait_name> {
            fn from(source: Box<$source_type>) -> Self {
                source as Box<dyn $trait_name>
            }
        }
    };
}
