use lexer::token::Token;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Expr {
    Number(Rc<Token>),
    String(Rc<Token>),
    Bool(Rc<Token>),
    Null(Rc<Token>),
    Identifier(Rc<Token>),
    Unary(Rc<Token>, Box<Expr>),
    Binary(Rc<Token>, Box<Expr>, Box<Expr>),
    /// The operator token keeps the compound-assignment kind (`=`, `+=`, …).
    Assignment(Rc<Token>, Box<Expr>, Box<Expr>),
    Call(Rc<Token>, Box<Expr>, Vec<Expr>),
    Member(Rc<Token>, Box<Expr>, Rc<Token>),
    Index(Rc<Token>, Box<Expr>, Box<Expr>),
    List(Rc<Token>, Vec<Expr>),
    Dict(Rc<Token>, Vec<(Expr, Expr)>),
    Lambda(Rc<Token>, Vec<Rc<Token>>, Box<Stmt>),
    Ternary(Rc<Token>, Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn token(&self) -> Rc<Token> {
        match self {
            Self::Number(token)
            | Self::String(token)
            | Self::Bool(token)
            | Self::Null(token)
            | Self::Identifier(token)
            | Self::Unary(token, ..)
            | Self::Binary(token, ..)
            | Self::Assignment(token, ..)
            | Self::Call(token, ..)
            | Self::Member(token, ..)
            | Self::Index(token, ..)
            | Self::List(token, ..)
            | Self::Dict(token, ..)
            | Self::Lambda(token, ..)
            | Self::Ternary(token, ..) => Rc::clone(token),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// keyword token, name, initializer, mutable flag (`متغير` vs `ثابت`).
    VarDecl(Rc<Token>, Rc<Token>, Option<Expr>, bool),
    FuncDecl(Rc<Token>, Vec<Rc<Token>>, Box<Stmt>),
    /// name, parent, methods (each a `FuncDecl`).
    ClassDecl(Rc<Token>, Option<Rc<Token>>, Vec<Stmt>),
    Return(Rc<Token>, Option<Expr>),
    If(Rc<Token>, Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Rc<Token>, Expr, Box<Stmt>),
    /// keyword, init var, init expr, condition, increment, body.
    For(
        Rc<Token>,
        Option<Rc<Token>>,
        Option<Expr>,
        Option<Expr>,
        Option<Expr>,
        Box<Stmt>,
    ),
    /// keyword, loop variable, iterable, body.
    Foreach(Rc<Token>, Rc<Token>, Expr, Box<Stmt>),
    Break(Rc<Token>),
    Continue(Rc<Token>),
    Block(Vec<Stmt>),
    Expr(Expr),
    /// keyword, imported names, module string token.
    Import(Rc<Token>, Vec<Rc<Token>>, Rc<Token>),
    Export(Rc<Token>, Vec<Rc<Token>>),
}

impl Stmt {
    pub fn as_block(&self) -> &Vec<Stmt> {
        match self {
            Self::Block(stmts) => stmts,
            _ => unreachable!(),
        }
    }
}
