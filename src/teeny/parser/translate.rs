use crate::teeny::{
    emitter::Emitter,
    lexer::{Lexer, TokenKind},
};

use super::{context::ParseContext, error::CompileError};

/// Shape shared by `IF ... THEN ... ENDIF` and `WHILE ... REPEAT ... ENDWHILE`.
struct Block {
    guard: &'static str,
    open: TokenKind,
    close: TokenKind,
}

const IF_BLOCK: Block = Block {
    guard: "if(",
    open: TokenKind::Then,
    close: TokenKind::EndIf,
};

const WHILE_BLOCK: Block = Block {
    guard: "while(",
    open: TokenKind::Repeat,
    close: TokenKind::EndWhile,
};

/// Translates a whole program to C in a single pass.
pub fn translate(src: &str) -> Result<Emitter, CompileError> {
    let mut ctx = ParseContext::new(Lexer::new(src))?;
    parse_program(&mut ctx)?;
    Ok(ctx.into_emitter())
}

fn parse_program(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::debug!("PROGRAM");
    ctx.header_line("#include <stdio.h>");
    ctx.header_line("int main(void){");

    while ctx.check(TokenKind::Newline) {
        ctx.advance()?;
    }

    while !ctx.check(TokenKind::Eof) {
        parse_statement(ctx)?;
    }

    ctx.emit_line("return 0;");
    ctx.emit_line("}");

    // Labels may be declared after the GOTO that uses them
    ctx.check_labels()
}

fn parse_statement(ctx: &mut ParseContext) -> Result<(), CompileError> {
    let kind = ctx.current().kind();
    log::debug!("STATEMENT-{} (next {})", kind, ctx.peek());

    match kind {
        TokenKind::Print => parse_print(ctx)?,
        TokenKind::If => parse_block(ctx, &IF_BLOCK)?,
        TokenKind::While => parse_block(ctx, &WHILE_BLOCK)?,
        TokenKind::Label => parse_label(ctx)?,
        TokenKind::Goto => parse_goto(ctx)?,
        TokenKind::Let => parse_let(ctx)?,
        TokenKind::Input => parse_input(ctx)?,
        _ => return Err(CompileError::InvalidStatement(ctx.current().clone())),
    }

    parse_newlines(ctx)
}

fn parse_print(ctx: &mut ParseContext) -> Result<(), CompileError> {
    ctx.advance()?;

    if ctx.check(TokenKind::String) {
        let text = ctx.advance()?;
        ctx.emit_line(&format!("printf(\"{}\\n\");", text.text()));
    } else {
        ctx.emit("printf(\"%.2f\\n\", (float)(");
        parse_expression(ctx)?;
        ctx.emit_line("));");
    }
    Ok(())
}

fn parse_block(ctx: &mut ParseContext, block: &Block) -> Result<(), CompileError> {
    ctx.advance()?;
    ctx.emit(block.guard);
    parse_comparison(ctx)?;
    ctx.expect(block.open)?;
    parse_newlines(ctx)?;
    ctx.emit_line("){");

    while !ctx.check(block.close) {
        if ctx.check(TokenKind::Eof) {
            return Err(CompileError::UnexpectedToken {
                line: ctx.current().line(),
                expected: block.close,
                found: TokenKind::Eof,
            });
        }
        parse_statement(ctx)?;
    }

    ctx.expect(block.close)?;
    ctx.emit_line("}");
    Ok(())
}

fn parse_label(ctx: &mut ParseContext) -> Result<(), CompileError> {
    ctx.advance()?;
    let label = ctx.expect(TokenKind::Ident)?;
    ctx.declare_label(&label)?;
    ctx.emit_line(&format!("{}:", label.text()));
    Ok(())
}

fn parse_goto(ctx: &mut ParseContext) -> Result<(), CompileError> {
    ctx.advance()?;
    let label = ctx.expect(TokenKind::Ident)?;
    ctx.use_label(label.text());
    ctx.emit_line(&format!("goto {};", label.text()));
    Ok(())
}

/// Declares `name` in the header the first time it is assigned.
fn declare_variable(ctx: &mut ParseContext, name: &str) {
    if ctx.declare_symbol(name) {
        ctx.header_line(&format!("float {};", name));
    }
}

fn parse_let(ctx: &mut ParseContext) -> Result<(), CompileError> {
    ctx.advance()?;
    let ident = ctx.expect(TokenKind::Ident)?;
    let name = ident.text();

    declare_variable(ctx, name);
    ctx.emit(&format!("{} = ", name));

    ctx.expect(TokenKind::Eq)?;
    parse_expression(ctx)?;
    ctx.emit_line(";");
    Ok(())
}

fn parse_input(ctx: &mut ParseContext) -> Result<(), CompileError> {
    ctx.advance()?;
    let ident = ctx.expect(TokenKind::Ident)?;
    let name = ident.text();

    declare_variable(ctx, name);

    // Bad input zeroes the variable and discards the rest of the line
    ctx.emit_line(&format!("if(0 == scanf(\"%f\", &{})) {{", name));
    ctx.emit_line(&format!("{} = 0;", name));
    ctx.emit_line("scanf(\"%*s\");");
    ctx.emit_line("}");
    Ok(())
}

/// expression (`==` | `!=` | `<` | `<=` | `>` | `>=` expression)+
///
/// Chains such as `a < b < c` are accepted and emitted as written.
fn parse_comparison(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::trace!("COMPARISON");
    parse_expression(ctx)?;

    if !ctx.current().kind().is_comparison() {
        return Err(CompileError::ExpectedComparison(ctx.current().clone()));
    }

    while ctx.current().kind().is_comparison() {
        let op = ctx.advance()?;
        ctx.emit(op.text());
        parse_expression(ctx)?;
    }
    Ok(())
}

/// term (`+` | `-` term)*
fn parse_expression(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::trace!("EXPRESSION");
    parse_term(ctx)?;

    while ctx.check(TokenKind::Plus) || ctx.check(TokenKind::Minus) {
        let op = ctx.advance()?;
        ctx.emit(op.text());
        parse_term(ctx)?;
    }
    Ok(())
}

/// unary (`*` | `/` unary)*
fn parse_term(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::trace!("TERM");
    parse_unary(ctx)?;

    while ctx.check(TokenKind::Asterisk) || ctx.check(TokenKind::Slash) {
        let op = ctx.advance()?;
        ctx.emit(op.text());
        parse_unary(ctx)?;
    }
    Ok(())
}

/// [`+` | `/`] primary
///
/// Only `+` and `/` are accepted as prefixes. There is no unary minus.
fn parse_unary(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::trace!("UNARY");

    if ctx.check(TokenKind::Plus) || ctx.check(TokenKind::Slash) {
        let op = ctx.advance()?;
        ctx.emit(op.text());
    }
    parse_primary(ctx)
}

/// number | declared identifier
fn parse_primary(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::trace!("PRIMARY ({})", ctx.current());

    match ctx.current().kind() {
        TokenKind::Number => {
            let number = ctx.advance()?;
            ctx.emit(number.text());
        }
        TokenKind::Ident => {
            let name = ctx.current().text();
            if !ctx.is_declared(name) {
                return Err(CompileError::UndeclaredVariable {
                    line: ctx.current().line(),
                    name: name.to_owned(),
                });
            }
            let ident = ctx.advance()?;
            ctx.emit(ident.text());
        }
        _ => return Err(CompileError::UnexpectedPrimary(ctx.current().clone())),
    }
    Ok(())
}

/// One mandatory end of line followed by any number of blank lines.
fn parse_newlines(ctx: &mut ParseContext) -> Result<(), CompileError> {
    log::trace!("NEWLINE");
    ctx.expect(TokenKind::Newline)?;

    while ctx.check(TokenKind::Newline) {
        ctx.advance()?;
    }
    Ok(())
}
