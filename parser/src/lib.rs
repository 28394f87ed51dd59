pub mod ast;
pub mod error;

use ast::{Expr, Stmt};
use error::ParseError;
use lexer::token::{Token, TokenType, BINARY_SET, BOUNDARIES};
use lexer::{Lexer, LexicalError};
use std::rc::Rc;

pub struct Parser {
    tokens: Vec<Rc<Token>>,
    current: usize,
    errors: Vec<ParseError>,
}

type ParseResult<T> = Result<T, ()>;

impl Parser {
    pub fn new(tokens: Vec<Rc<Token>>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: vec![],
        }
    }

    pub fn from_source(source: &str) -> Result<Self, Vec<LexicalError>> {
        Ok(Self::new(Lexer::new(source).tokenize()?))
    }

    fn peek(&self) -> Rc<Token> {
        Rc::clone(&self.tokens[self.current])
    }

    fn previous(&self) -> Rc<Token> {
        Rc::clone(&self.tokens[self.current - 1])
    }

    fn at_end(&self) -> bool {
        self.peek().typ == TokenType::EOF
    }

    fn check(&self, typ: TokenType) -> bool {
        self.peek().typ == typ
    }

    fn check_ahead(&self, distance: usize, typ: TokenType) -> bool {
        match self.tokens.get(self.current + distance) {
            Some(token) => token.typ == typ,
            None => false,
        }
    }

    fn advance(&mut self) -> Rc<Token> {
        if !self.at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn matches(&mut self, typ: TokenType) -> bool {
        if self.check(typ) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_any(&mut self, types: &[TokenType]) -> bool {
        for typ in types {
            if self.matches(*typ) {
                return true;
            }
        }
        false
    }

    fn consume(&mut self, typ: TokenType) -> ParseResult<Rc<Token>> {
        if self.check(typ) {
            Ok(self.advance())
        } else {
            self.errors
                .push(ParseError::ExpectedInstead(vec![typ], self.peek()));
            Err(())
        }
    }

    fn consume_identifier(&mut self, what: &'static str) -> ParseResult<Rc<Token>> {
        if self.check(TokenType::Identifier) {
            Ok(self.advance())
        } else {
            self.errors
                .push(ParseError::ExpectedName(what, self.peek()));
            Err(())
        }
    }

    fn synchronize(&mut self) {
        while !self.at_end() {
            if self.previous().typ == TokenType::Semicolon {
                return;
            }
            if BOUNDARIES.contains(&self.peek().typ) {
                return;
            }
            self.advance();
        }
    }

    //>> Expressions

    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.ternary()?;

        if self.matches_any(&BINARY_SET) {
            let op = self.previous();
            let value = self.assignment()?;
            return match expr {
                Expr::Identifier(_) | Expr::Member(..) | Expr::Index(..) => {
                    Ok(Expr::Assignment(op, Box::new(expr), Box::new(value)))
                }
                _ => {
                    self.errors.push(ParseError::InvalidTarget(op));
                    Err(())
                }
            };
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> ParseResult<Expr> {
        let condition = self.or()?;

        if self.matches(TokenType::QuestionMark) {
            let op = self.previous();
            let then_expr = self.parse_expr()?;
            self.consume(TokenType::Colon)?;
            let else_expr = self.ternary()?;
            return Ok(Expr::Ternary(
                op,
                Box::new(condition),
                Box::new(then_expr),
                Box::new(else_expr),
            ));
        }

        Ok(condition)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(TokenType::Or) {
            let op = self.previous();
            let right = self.and()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(TokenType::And) {
            let op = self.previous();
            let right = self.equality()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while self.matches_any(&[TokenType::DEqual, TokenType::BangEqual]) {
            let op = self.previous();
            let right = self.comparison()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.bit_or()?;
        while self.matches_any(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let op = self.previous();
            let right = self.bit_or()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn bit_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.bit_xor()?;
        while self.matches(TokenType::Pipe) {
            let op = self.previous();
            let right = self.bit_xor()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn bit_xor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.bit_and()?;
        while self.matches(TokenType::Caret) {
            let op = self.previous();
            let right = self.bit_and()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn bit_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.shift()?;
        while self.matches(TokenType::Amp) {
            let op = self.previous();
            let right = self.shift()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn shift(&mut self) -> ParseResult<Expr> {
        let mut expr = self.additive()?;
        while self.matches_any(&[TokenType::Shl, TokenType::Shr]) {
            let op = self.previous();
            let right = self.additive()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        let mut expr = self.multiplicative()?;
        while self.matches_any(&[TokenType::Plus, TokenType::Minus]) {
            let op = self.previous();
            let right = self.multiplicative()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while self.matches_any(&[
            TokenType::Star,
            TokenType::Slash,
            TokenType::Percent,
            TokenType::DStar,
        ]) {
            let op = self.previous();
            let right = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches_any(&[
            TokenType::Minus,
            TokenType::Bang,
            TokenType::Not,
            TokenType::Tilde,
            TokenType::DPlus,
            TokenType::DMinus,
        ]) {
            let op = self.previous();
            let operand = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(TokenType::OParen) {
                let token = self.previous();
                let mut args = vec![];
                if !self.check(TokenType::CParen) {
                    loop {
                        args.push(self.parse_expr()?);
                        if !self.matches(TokenType::Comma) {
                            break;
                        }
                    }
                }
                self.consume(TokenType::CParen)?;
                expr = Expr::Call(token, Box::new(expr), args);
            } else if self.matches(TokenType::Period) {
                let token = self.previous();
                let name = self.consume_identifier("الخاصية")?;
                expr = Expr::Member(token, Box::new(expr), name);
            } else if self.matches(TokenType::OBracket) {
                let token = self.previous();
                let index = self.parse_expr()?;
                self.consume(TokenType::CBracket)?;
                expr = Expr::Index(token, Box::new(expr), Box::new(index));
            } else if self.matches(TokenType::DPlus) || self.matches(TokenType::DMinus) {
                let op = self.previous();
                expr = Expr::Unary(op, Box::new(expr));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(TokenType::Number) {
            return Ok(Expr::Number(self.previous()));
        }
        if self.matches(TokenType::String) {
            return Ok(Expr::String(self.previous()));
        }
        if self.matches(TokenType::True) || self.matches(TokenType::False) {
            return Ok(Expr::Bool(self.previous()));
        }
        if self.matches(TokenType::Null) {
            return Ok(Expr::Null(self.previous()));
        }
        if self.matches(TokenType::Identifier) || self.matches(TokenType::This) {
            return Ok(Expr::Identifier(self.previous()));
        }
        // 'جديد' is surface decoration: instantiation is calling the class.
        if self.matches(TokenType::New) {
            return self.postfix();
        }
        if self.matches(TokenType::OParen) {
            let expr = self.parse_expr()?;
            self.consume(TokenType::CParen)?;
            return Ok(expr);
        }
        if self.matches(TokenType::OBracket) {
            let token = self.previous();
            let mut elements = vec![];
            if !self.check(TokenType::CBracket) {
                loop {
                    elements.push(self.parse_expr()?);
                    if !self.matches(TokenType::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenType::CBracket)?;
            return Ok(Expr::List(token, elements));
        }
        if self.matches(TokenType::OBrace) {
            let token = self.previous();
            let mut pairs = vec![];
            if !self.check(TokenType::CBrace) {
                loop {
                    let key = self.parse_expr()?;
                    self.consume(TokenType::Colon)?;
                    let value = self.parse_expr()?;
                    pairs.push((key, value));
                    if !self.matches(TokenType::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenType::CBrace)?;
            return Ok(Expr::Dict(token, pairs));
        }
        if self.matches(TokenType::Function) {
            return self.lambda();
        }

        self.errors.push(ParseError::ExpectedExpr(self.peek()));
        Err(())
    }

    fn params(&mut self) -> ParseResult<Vec<Rc<Token>>> {
        self.consume(TokenType::OParen)?;
        let mut params = vec![];
        if !self.check(TokenType::CParen) {
            loop {
                params.push(self.consume_identifier("المعامل")?);
                if !self.matches(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::CParen)?;
        Ok(params)
    }

    fn lambda(&mut self) -> ParseResult<Expr> {
        let token = self.previous();
        let params = self.params()?;
        let body = if self.matches(TokenType::Arrow) {
            let arrow = self.previous();
            let value = self.parse_expr()?;
            Stmt::Block(vec![Stmt::Return(arrow, Some(value))])
        } else {
            self.consume(TokenType::OBrace)?;
            self.block()?
        };
        Ok(Expr::Lambda(token, params, Box::new(body)))
    }

    //>> Statements

    fn block(&mut self) -> ParseResult<Stmt> {
        let mut stmts = vec![];
        while !self.check(TokenType::CBrace) && !self.at_end() {
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(_) => self.synchronize(),
            }
        }
        self.consume(TokenType::CBrace)?;
        Ok(Stmt::Block(stmts))
    }

    fn var_decl(&mut self, mutable: bool) -> ParseResult<Stmt> {
        let keyword = self.previous();
        let name = self.consume_identifier("المتغير")?;
        let initializer = if self.matches(TokenType::Equal) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::VarDecl(keyword, name, initializer, mutable))
    }

    fn func_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume_identifier("الدالة")?;
        let params = self.params()?;
        self.consume(TokenType::OBrace)?;
        let body = self.block()?;
        Ok(Stmt::FuncDecl(name, params, Box::new(body)))
    }

    fn class_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume_identifier("الصنف")?;
        let parent = if self.matches(TokenType::Colon) {
            Some(self.consume_identifier("الصنف الأب")?)
        } else {
            None
        };
        self.consume(TokenType::OBrace)?;
        let mut methods = vec![];
        while !self.check(TokenType::CBrace) && !self.at_end() {
            self.matches(TokenType::Function);
            let method_name = self.consume_identifier("الطريقة")?;
            let params = self.params()?;
            self.consume(TokenType::OBrace)?;
            let body = self.block()?;
            methods.push(Stmt::FuncDecl(method_name, params, Box::new(body)));
        }
        self.consume(TokenType::CBrace)?;
        Ok(Stmt::ClassDecl(name, parent, methods))
    }

    fn if_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        self.consume(TokenType::OParen)?;
        let condition = self.parse_expr()?;
        self.consume(TokenType::CParen)?;
        let then_branch = self.statement()?;
        let else_branch = if self.matches(TokenType::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(keyword, condition, Box::new(then_branch), else_branch))
    }

    fn while_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        self.consume(TokenType::OParen)?;
        let condition = self.parse_expr()?;
        self.consume(TokenType::CParen)?;
        let body = self.statement()?;
        Ok(Stmt::While(keyword, condition, Box::new(body)))
    }

    /// `لكل` heads both the C-style loop and the foreach form.
    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        self.consume(TokenType::OParen)?;

        if self.check(TokenType::Identifier) && self.check_ahead(1, TokenType::In) {
            let var = self.advance();
            self.advance();
            let iterable = self.parse_expr()?;
            self.consume(TokenType::CParen)?;
            let body = self.statement()?;
            return Ok(Stmt::Foreach(keyword, var, iterable, Box::new(body)));
        }

        let mut init_var = None;
        let mut init_expr = None;
        if self.matches(TokenType::Var) {
            init_var = Some(self.consume_identifier("المتغير")?);
            if self.matches(TokenType::Equal) {
                init_expr = Some(self.parse_expr()?);
            }
            self.consume(TokenType::Semicolon)?;
        } else if self.matches(TokenType::Semicolon) {
            // no initializer
        } else {
            init_expr = Some(self.parse_expr()?);
            self.consume(TokenType::Semicolon)?;
        }

        let condition = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(TokenType::Semicolon)?;

        let increment = if self.check(TokenType::CParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(TokenType::CParen)?;

        let body = self.statement()?;
        Ok(Stmt::For(
            keyword,
            init_var,
            init_expr,
            condition,
            increment,
            Box::new(body),
        ))
    }

    fn return_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Return(keyword, value))
    }

    fn import_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        let mut names = vec![];
        let module = if self.check(TokenType::String) {
            self.advance()
        } else {
            loop {
                names.push(self.consume_identifier("المستورد")?);
                if !self.matches(TokenType::Comma) {
                    break;
                }
            }
            self.consume(TokenType::From)?;
            self.consume(TokenType::String)?
        };
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Import(keyword, names, module))
    }

    fn export_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        let mut names = vec![];
        loop {
            names.push(self.consume_identifier("المصدر")?);
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Export(keyword, names))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(TokenType::If) {
            return self.if_stmt();
        }
        if self.matches(TokenType::While) {
            return self.while_stmt();
        }
        if self.matches(TokenType::For) {
            return self.for_stmt();
        }
        if self.matches(TokenType::Return) {
            return self.return_stmt();
        }
        if self.matches(TokenType::Break) {
            let keyword = self.previous();
            self.consume(TokenType::Semicolon)?;
            return Ok(Stmt::Break(keyword));
        }
        if self.matches(TokenType::Continue) {
            let keyword = self.previous();
            self.consume(TokenType::Semicolon)?;
            return Ok(Stmt::Continue(keyword));
        }
        if self.matches(TokenType::OBrace) {
            return self.block();
        }
        if self.matches(TokenType::Import) {
            return self.import_stmt();
        }
        if self.matches(TokenType::Export) {
            return self.export_stmt();
        }

        let expr = self.parse_expr()?;
        self.consume(TokenType::Semicolon)?;
        Ok(Stmt::Expr(expr))
    }

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.matches(TokenType::Var) {
            return self.var_decl(true);
        }
        if self.matches(TokenType::Const) {
            return self.var_decl(false);
        }
        if self.check(TokenType::Function) && self.check_ahead(1, TokenType::Identifier) {
            self.advance();
            return self.func_decl();
        }
        if self.matches(TokenType::Class) {
            return self.class_decl();
        }
        self.statement()
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, Vec<ParseError>> {
        let mut stmts = vec![];
        while !self.at_end() {
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(_) => self.synchronize(),
            }
        }
        if self.errors.is_empty() {
            Ok(stmts)
        } else {
            Err(self.errors.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ast::Expr, ast::Stmt, Parser};

    fn parse(source: &str) -> Vec<Stmt> {
        Parser::from_source(source).unwrap().parse().unwrap()
    }

    #[test]
    fn precedence() {
        let stmts = parse("متغير س = 1 + 2 * 3؛");
        match &stmts[0] {
            Stmt::VarDecl(_, _, Some(Expr::Binary(op, _, rhs)), _) => {
                assert_eq!(op.lexeme, "+");
                assert!(matches!(&**rhs, Expr::Binary(..)));
            }
            other => panic!("غير متوقع: {other:?}"),
        }
    }

    #[test]
    fn assignment_targets() {
        parse("س = 3؛");
        parse("س.ص = 3؛");
        parse("س[0] = 3؛");
        assert!(Parser::from_source("3 + س = 4؛").unwrap().parse().is_err());
    }

    #[test]
    fn class_with_parent() {
        let stmts = parse("صنف ب: أ { حيي() { أرجع فارغ؛ } }");
        match &stmts[0] {
            Stmt::ClassDecl(name, parent, methods) => {
                assert_eq!(name.lexeme, "ب");
                assert_eq!(parent.as_ref().unwrap().lexeme, "أ");
                assert_eq!(methods.len(), 1);
            }
            other => panic!("غير متوقع: {other:?}"),
        }
    }

    #[test]
    fn new_is_a_call() {
        let stmts = parse("(جديد ب()).حيي()؛");
        match &stmts[0] {
            Stmt::Expr(Expr::Call(_, callee, _)) => {
                assert!(matches!(&**callee, Expr::Member(..)));
            }
            other => panic!("غير متوقع: {other:?}"),
        }
    }

    #[test]
    fn for_both_forms() {
        parse("لكل (متغير س = 0؛ س < 3؛ س++) { اطبع(س)؛ }");
        parse("لكل (س في [1، 2، 3]) { اطبع(س)؛ }");
    }

    #[test]
    fn lambda_forms() {
        parse("متغير ضعف = دالة(س) => س * 2؛");
        parse("متغير ضعف = دالة(س) { أرجع س * 2؛ }؛");
    }

    #[test]
    fn recovers_multiple_errors() {
        let errors = Parser::from_source("متغير ؛ متغير ص = ؛")
            .unwrap()
            .parse()
            .unwrap_err();
        assert!(errors.len() >= 2);
    }
}
