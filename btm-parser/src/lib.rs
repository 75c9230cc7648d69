//! Numbers, expression trees and the formula parser of the BTM engine.
//!
//! ```
//! use btm_parser::parse;
//!
//! let expr = parse("2(x+1)^2");
//! assert!(!expr.has_parsing_error());
//! assert_eq!(expr.to_string(), "2*(x+1)^2");
//! ```

pub mod expr;
pub mod number;
pub mod parser;
pub mod tokenizer;

pub use expr::Expr;
pub use number::Number;
pub use parser::{parse, NameScope, Parser, ParserConfig};
