use colored::Colorize;
use lexer::token::{Token, TokenType};
use std::{fmt, rc::Rc};

#[derive(Debug, Clone)]
pub enum ParseError {
    ExpectedInstead(Vec<TokenType>, Rc<Token>),
    ExpectedExpr(Rc<Token>),
    InvalidTarget(Rc<Token>),
    ExpectedName(&'static str, Rc<Token>),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", "خطأ تحليلي: ".bright_red())?;
        match self {
            Self::ExpectedInstead(expected, token) => {
                let got: &str = token.typ.into();
                write!(
                    f,
                    "توقعت {} ولكن حصلت على \"{got}\"\n{token}",
                    expected
                        .iter()
                        .map(|typ| {
                            let as_str: &str = (*typ).into();
                            format!("\"{as_str}\"")
                        })
                        .collect::<Vec<_>>()
                        .join(" أو "),
                )
            }
            Self::ExpectedExpr(token) => {
                let got: &str = token.typ.into();
                write!(f, "توقعت عبارة ولكن حصلت على \"{got}\"\n{token}")
            }
            Self::InvalidTarget(token) => {
                write!(f, "الجانب الأيسر لعلامة التساوي غير صالح للإسناد\n{token}")
            }
            Self::ExpectedName(what, token) => {
                write!(f, "توقعت اسم {what}\n{token}")
            }
        }
    }
}
