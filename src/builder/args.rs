//! Argument-type widening for `CallBuilder::args`.
//!
//! Resolvers registered before an `args::<T>()` call keep working on the
//! narrower argument type: the builder projects each call's `T` back onto it
//! through [`ExtendsArgs::base_args`].
//!
//! ```rust,ignore
//! #[derive(Clone)]
//! struct Api { token: String }
//!
//! struct GetUser { api: Api, id: u64 }
//!
//! impl ExtendsArgs<Api> for GetUser {
//!     fn base_args(&self) -> &Api { &self.api }
//! }
//!
//! let users = build_call()
//!     .args::<Api>()
//!     .headers_with(|api: &Api| [("authorization", format!("Bearer {}", api.token))])
//!     .args::<GetUser>()
//!     .path_with(|args: &GetUser| format!("/users/{}", args.id));
//! ```

/// An argument type that contains (extends) the argument type `A`.
///
/// Every type also extends `()`, so call `base_args` with the trait's type
/// parameter spelled out: `ExtendsArgs::<Api>::base_args(&args)`.
pub trait ExtendsArgs<A> {
    fn base_args(&self) -> &A;
}

/// Every argument type extends the empty argument type.
impl<T> ExtendsArgs<()> for T {
    fn base_args(&self) -> &() {
        &()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base {
        token: &'static str,
    }

    struct Derived {
        base: Base,
    }

    impl ExtendsArgs<Base> for Derived {
        fn base_args(&self) -> &Base {
            &self.base
        }
    }

    #[test]
    fn projects_to_base() {
        let derived = Derived {
            base: Base { token: "t" },
        };
        assert_eq!(ExtendsArgs::<Base>::base_args(&derived).token, "t");
        let _: &() = ExtendsArgs::<()>::base_args(&derived);
    }
}
