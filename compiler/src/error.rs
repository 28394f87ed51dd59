use colored::Colorize;
use lexer::token::Token;
use std::{fmt, rc::Rc};

#[derive(Debug, Clone)]
pub enum CompileError {
    TooManyConsts(Rc<Token>),
    TooManyLocals(Rc<Token>),
    TooManyUpvalues(Rc<Token>),
    TooManyElements(Rc<Token>),
    TooManyArgs(Rc<Token>),
    TooManyParams(Rc<Token>),
    HugeJump(Rc<Token>),
    SameVarInScope(Rc<Token>),
    UninitializedRead(Rc<Token>),
    AssignToConst(Rc<Token>),
    InvalidTarget(Rc<Token>),
    ReturnOutsideFunction(Rc<Token>),
    ThisOutsideMethod(Rc<Token>),
    BreakOutsideLoop(Rc<Token>),
    ContinueOutsideLoop(Rc<Token>),
}

use CompileError::*;

impl CompileError {
    pub fn token(&self) -> &Rc<Token> {
        match self {
            TooManyConsts(token) | TooManyLocals(token) | TooManyUpvalues(token)
            | TooManyElements(token) | TooManyArgs(token) | TooManyParams(token)
            | HugeJump(token) | SameVarInScope(token) | UninitializedRead(token)
            | AssignToConst(token) | InvalidTarget(token) | ReturnOutsideFunction(token)
            | ThisOutsideMethod(token) | BreakOutsideLoop(token) | ContinueOutsideLoop(token) => {
                token
            }
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", "خطأ ترجمي: ".bright_red())?;
        match self {
            TooManyConsts(token) => {
                writeln!(f, "لا يمكن أن تحتوي الكتلة الواحدة على أكثر من 256 ثابت")?;
                write!(f, "{token}")
            }
            TooManyLocals(token) => {
                writeln!(f, "لا يمكن أن تحتوي الدالة على أكثر من 256 متغير محلي")?;
                write!(f, "{token}")
            }
            TooManyUpvalues(token) => {
                writeln!(f, "لا يمكن لدالة أن تشير إلى أكثر من 256 متغير من دوال محيطة بها")?;
                write!(f, "{token}")
            }
            TooManyElements(token) => {
                writeln!(f, "لا يمكن إنشاء قائمة أو قاموس بأكثر من 255 عنصر")?;
                write!(f, "{token}")
            }
            TooManyArgs(token) => {
                writeln!(f, "لا يمكن استدعاء دالة بأكثر من 255 مدخل")?;
                write!(f, "{token}")
            }
            TooManyParams(token) => {
                writeln!(f, "لا يمكن أن تملك دالة أكثر من 255 معامل")?;
                write!(f, "{token}")
            }
            HugeJump(token) => {
                writeln!(f, "القفزة أكبر من المسموح (65535 بايت)")?;
                write!(f, "{token}")
            }
            SameVarInScope(token) => {
                writeln!(
                    f,
                    "يوجد متغير يسمى \"{}\" في نفس المجموعة",
                    token.lexeme
                )?;
                write!(f, "{token}")
            }
            UninitializedRead(token) => {
                writeln!(
                    f,
                    "لا يمكن قراءة \"{}\" قبل اكتمال تعريفه",
                    token.lexeme
                )?;
                write!(f, "{token}")
            }
            AssignToConst(token) => {
                writeln!(f, "لا يمكن إسناد قيمة إلى الثابت \"{}\"", token.lexeme)?;
                write!(f, "{token}")
            }
            InvalidTarget(token) => {
                writeln!(f, "لا يصلح هذا الطرف للإسناد")?;
                write!(f, "{token}")
            }
            ReturnOutsideFunction(token) => {
                writeln!(f, "لا يمكنك استخدام 'أرجع' خارج دالة")?;
                write!(f, "{token}")
            }
            ThisOutsideMethod(token) => {
                writeln!(f, "لا يمكنك استخدام 'هذا' خارج طريقة")?;
                write!(f, "{token}")
            }
            BreakOutsideLoop(token) => {
                writeln!(f, "لا يمكنك استخدام 'توقف' خارج حلقة تكرارية")?;
                write!(f, "{token}")
            }
            ContinueOutsideLoop(token) => {
                writeln!(f, "لا يمكنك استخدام 'استمر' خارج حلقة تكرارية")?;
                write!(f, "{token}")
            }
        }
    }
}
