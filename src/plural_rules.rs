//! `Plural-Forms` compilation and the language fallback table.
//!
//! A header such as `nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 ? 1 : 2);`
//! compiles into a [`PluralSelector`] mapping a count to a translation index.
//! The expression language is a closed subset of C: the variable `n`, integer
//! literals, parentheses, `! && || == != < <= > >= %` and `?:`.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use unic_langid::LanguageIdentifier;

use crate::error::Error;

const ENGLISH: &str = "nplurals=2; plural=(n != 1);";

lazy_static! {
    static ref NPLURALS_REGEX: Regex = Regex::new(r"(?:^|;)\s*nplurals\s*=\s*(\d+)\s*(?:;|$)").unwrap();
    static ref PLURAL_REGEX: Regex = Regex::new(r"(?:^|;)\s*plural\s*=\s*([^;]*)").unwrap();

    /// Static mapping from base language subtag → gettext `Plural-Forms` value.
    static ref LANGUAGE_TABLE: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();

        // Only one form (East/Southeast Asian common cases)
        for code in ["ja","zh","ko","th","vi","id","ms","lo","km","my","ka","yue","jv","su"] {
            m.insert(code, "nplurals=1; plural=0;");
        }

        // One/Other, singular only for exactly one
        for code in [
            "en","de","nl","sv","da","nb","nn","no","is","fi","et","it","es","pt","el",
            "eu","gl","af","bg","ca","eo","fo","fy","hu","nds","sq","sw","ur","hi","bn",
            "gu","ta","te","kn","ml","mr","ne","pa","tr","az","kk","ky","mn","he","iw",
        ] {
            m.insert(code, ENGLISH);
        }

        // One/Other, zero counts as singular
        for code in ["fr","oc","br","fil","tl","ln","mg","ti","wa","hy","kab","ak","am"] {
            m.insert(code, "nplurals=2; plural=(n > 1);");
        }

        // East Slavic and Serbo-Croatian
        for code in ["ru","uk","be","sr","hr","bs","sh"] {
            m.insert(
                code,
                "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
            );
        }

        m.insert(
            "pl",
            "nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
        );

        for code in ["cs","sk"] {
            m.insert(code, "nplurals=3; plural=(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2;");
        }

        m.insert(
            "lt",
            "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2);",
        );
        m.insert("lv", "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n != 0 ? 1 : 2);");
        m.insert(
            "ro",
            "nplurals=3; plural=(n==1 ? 0 : (n==0 || (n%100 > 0 && n%100 < 20)) ? 1 : 2);",
        );
        m.insert(
            "sl",
            "nplurals=4; plural=(n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3);",
        );
        m.insert(
            "ga",
            "nplurals=5; plural=n==1 ? 0 : n==2 ? 1 : (n>2 && n<7) ? 2 : (n>6 && n<11) ? 3 : 4;",
        );
        m.insert(
            "ar",
            "nplurals=6; plural=(n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5);",
        );

        m
    };
}

/// A compiled plural rule: maps a count to a zero-based translation index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralSelector {
    nplurals: usize,
    expr: Expr,
}

impl PluralSelector {
    /// Compiles a full `Plural-Forms` value (`nplurals=<int>; plural=<expr>;`).
    pub fn compile(forms: &str) -> Result<Self, Error> {
        let nplurals = NPLURALS_REGEX
            .captures(forms)
            .and_then(|c| c[1].parse::<usize>().ok())
            .ok_or_else(|| {
                Error::MalformedExpression(format!("missing or invalid `nplurals` in `{}`", forms))
            })?;
        if nplurals == 0 {
            return Err(Error::MalformedExpression(
                "`nplurals` must be at least 1".to_string(),
            ));
        }

        let source = PLURAL_REGEX
            .captures(forms)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::MalformedExpression(format!("missing `plural` expression in `{}`", forms))
            })?;

        let expr = ExprParser::new(&source).parse()?;
        Ok(PluralSelector { nplurals, expr })
    }

    /// Returns the fallback rule for a language tag such as `ru`, `pt_BR` or `zh-Hant`.
    ///
    /// Only the primary language subtag is consulted; unknown or unparseable
    /// tags get the two-form English rule.
    pub fn for_language(tag: &str) -> Self {
        let normalized = tag.trim().replace('_', "-");
        let forms = normalized
            .parse::<LanguageIdentifier>()
            .ok()
            .and_then(|lang| LANGUAGE_TABLE.get(lang.language.as_str()).copied())
            .unwrap_or(ENGLISH);
        Self::compile(forms).unwrap_or_else(|_| Self::english())
    }

    /// Two forms, singular only for exactly one.
    pub fn english() -> Self {
        PluralSelector {
            nplurals: 2,
            expr: Expr::Binary(
                BinaryOp::Ne,
                Box::new(Expr::Var),
                Box::new(Expr::Literal(1)),
            ),
        }
    }

    /// Number of plural forms a translation should provide.
    pub fn nplurals(&self) -> usize {
        self.nplurals
    }

    /// Selects the translation index for `n`.
    ///
    /// Indices outside `0..nplurals` select form 0, as gettext does.
    pub fn select(&self, n: u64) -> usize {
        let index = self.expr.evaluate(n);
        match usize::try_from(index) {
            Ok(index) if index < self.nplurals => index,
            _ => 0,
        }
    }
}

impl Default for PluralSelector {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for PluralSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nplurals={}; plural={};", self.nplurals, self.expr)
    }
}

/// Compiles `forms`, returning `None` when it is not a usable selector.
pub fn lookup_plural_selector(forms: &str) -> Option<PluralSelector> {
    PluralSelector::compile(forms).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Rem,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Var,
    Literal(u64),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn evaluate(&self, n: u64) -> u64 {
        match self {
            Expr::Var => n,
            Expr::Literal(v) => *v,
            Expr::Not(inner) => u64::from(inner.evaluate(n) == 0),
            Expr::Ternary(cond, then, otherwise) => {
                if cond.evaluate(n) != 0 {
                    then.evaluate(n)
                } else {
                    otherwise.evaluate(n)
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = lhs.evaluate(n);
                match op {
                    BinaryOp::Or => u64::from(l != 0 || rhs.evaluate(n) != 0),
                    BinaryOp::And => u64::from(l != 0 && rhs.evaluate(n) != 0),
                    BinaryOp::Eq => u64::from(l == rhs.evaluate(n)),
                    BinaryOp::Ne => u64::from(l != rhs.evaluate(n)),
                    BinaryOp::Lt => u64::from(l < rhs.evaluate(n)),
                    BinaryOp::Le => u64::from(l <= rhs.evaluate(n)),
                    BinaryOp::Gt => u64::from(l > rhs.evaluate(n)),
                    BinaryOp::Ge => u64::from(l >= rhs.evaluate(n)),
                    // The compiler only accepts nonzero literal divisors.
                    BinaryOp::Rem => l.checked_rem(rhs.evaluate(n)).unwrap_or(0),
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var => write!(f, "n"),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Not(inner) => write!(f, "!({})", inner),
            Expr::Binary(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::Ternary(c, t, e) => write!(f, "({} ? {} : {})", c, t, e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Var,
    Number(u64),
    Op(BinaryOp),
    Not,
    Question,
    Colon,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();
        let (token, width) = match (c, next) {
            (b' ' | b'\t' | b'\r' | b'\n', _) => {
                i += 1;
                continue;
            }
            (b'0'..=b'9', _) => {
                let len = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
                let digits = &source[i..i + len];
                let value = digits.parse::<u64>().map_err(|_| {
                    Error::MalformedExpression(format!("integer literal `{}` is too large", digits))
                })?;
                (Token::Number(value), len)
            }
            (b'n', _) => (Token::Var, 1),
            (b'|', Some(b'|')) => (Token::Op(BinaryOp::Or), 2),
            (b'&', Some(b'&')) => (Token::Op(BinaryOp::And), 2),
            (b'=', Some(b'=')) => (Token::Op(BinaryOp::Eq), 2),
            (b'!', Some(b'=')) => (Token::Op(BinaryOp::Ne), 2),
            (b'<', Some(b'=')) => (Token::Op(BinaryOp::Le), 2),
            (b'>', Some(b'=')) => (Token::Op(BinaryOp::Ge), 2),
            (b'<', _) => (Token::Op(BinaryOp::Lt), 1),
            (b'>', _) => (Token::Op(BinaryOp::Gt), 1),
            (b'%', _) => (Token::Op(BinaryOp::Rem), 1),
            (b'!', _) => (Token::Not, 1),
            (b'?', _) => (Token::Question, 1),
            (b':', _) => (Token::Colon, 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            _ => {
                let ch = source[i..].chars().next().unwrap_or('?');
                return Err(Error::MalformedExpression(format!(
                    "unexpected `{}` at offset {} in `{}`",
                    ch, i, source
                )));
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Recursive-descent parser, one method per C precedence level.
struct ExprParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(source: &'a str) -> Self {
        ExprParser {
            source,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Expr, Error> {
        self.tokens = tokenize(self.source)?;
        let expr = self.ternary()?;
        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected trailing {:?}", token)));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: String) -> Error {
        Error::MalformedExpression(format!("{} in `{}`", message, self.source))
    }

    fn ternary(&mut self) -> Result<Expr, Error> {
        let cond = self.binary(0)?;
        if !self.eat(Token::Question) {
            return Ok(cond);
        }
        let then = self.ternary()?;
        if !self.eat(Token::Colon) {
            return Err(self.error("expected `:` in conditional".to_string()));
        }
        let otherwise = self.ternary()?;
        Ok(Expr::Ternary(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn binary(&mut self, level: usize) -> Result<Expr, Error> {
        const LEVELS: [&[BinaryOp]; 5] = [
            &[BinaryOp::Or],
            &[BinaryOp::And],
            &[BinaryOp::Eq, BinaryOp::Ne],
            &[BinaryOp::Lt, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Ge],
            &[BinaryOp::Rem],
        ];
        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };

        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(op)) = self.peek() {
            if !ops.contains(&op) {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(level + 1)?;
            if op == BinaryOp::Rem {
                match rhs {
                    Expr::Literal(0) => return Err(self.error("modulo by zero".to_string())),
                    Expr::Literal(_) => {}
                    _ => {
                        return Err(self.error("`%` requires an integer literal divisor".to_string()));
                    }
                }
            }
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, Error> {
        if self.eat(Token::Not) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, Error> {
        match self.peek() {
            Some(Token::Var) => {
                self.pos += 1;
                Ok(Expr::Var)
            }
            Some(Token::Number(v)) => {
                self.pos += 1;
                Ok(Expr::Literal(v))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.ternary()?;
                if !self.eat(Token::RParen) {
                    return Err(self.error("expected `)`".to_string()));
                }
                Ok(inner)
            }
            Some(token) => Err(self.error(format!("unexpected {:?}", token))),
            None => Err(self.error("unexpected end of expression".to_string())),
        }
    }
}
