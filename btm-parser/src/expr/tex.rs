//! LaTeX formatting of expressions.

use once_cell::sync::Lazy;
use std::{collections::HashSet, fmt::{Display, Formatter, Result}};
use super::{
    display::is_negative_literal,
    BinOp,
    Binary,
    Expr,
    ExprKind,
    Function,
    Multi,
    MultiOp,
    Unary,
    UnaryOp,
    Variable,
};

/// Nodes that can be written as TeX.
pub(crate) trait Tex {
    fn fmt_tex(&self, f: &mut Formatter) -> Result;

    /// Borrows the node as a [`Display`] value that writes its TeX form.
    fn tex(&self) -> TexDisplay<'_, Self> {
        TexDisplay(self)
    }
}

pub(crate) struct TexDisplay<'a, T: ?Sized>(&'a T);

impl<T: Tex + ?Sized> Display for TexDisplay<'_, T> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        self.0.fmt_tex(f)
    }
}

/// Names written as Greek letters.
static GREEK: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "kappa", "lambda",
        "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi", "omega",
        "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
    ].into_iter().collect()
});

impl Tex for Variable {
    fn fmt_tex(&self, f: &mut Formatter) -> Result {
        if let Some(n) = self.name.strip_prefix("input") {
            return write!(f, "\\boxed{{\\dots?^{{{}}}}}", n);
        }
        if GREEK.contains(self.name.as_str()) {
            write!(f, "\\{}", self.name)
        } else if self.name == "inf" {
            write!(f, "\\infty")
        } else if self.is_special() {
            write!(f, "\\mathrm{{{}}}", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl Function {
    /// Returns the LaTeX command used to name this function, including primes.
    fn tex_name(&self) -> String {
        let name = match self.name.as_str() {
            "sin" | "cos" | "tan" | "csc" | "sec" | "cot" | "ln" => format!("\\{}", self.name),
            "arcsin" | "arccos" | "arctan" | "arcsec" | "arccsc" | "arccot" => {
                format!("\\{}^{{-1}}", &self.name[3..])
            },
            "sqrt" => "\\mathrm{sqrt}".to_string(),
            "abs" => "\\abs".to_string(),
            "exp" | "expb" => "\\exp".to_string(),
            "log10" => "\\log_{10}".to_string(),
            name if name.len() > 1 => format!("\\mathrm{{{}}}", name),
            name => name.to_string(),
        };
        match self.derivs {
            0 => name,
            n @ 1..=3 => format!("{}{}", name, "'".repeat(n)),
            n => format!("{}^{{({})}}", name, n),
        }
    }
}

impl Tex for Function {
    fn fmt_tex(&self, f: &mut Formatter) -> Result {
        let arg = self.arg.tex();
        if self.derivs == 0 {
            match self.name.as_str() {
                "sqrt" => return write!(f, "\\sqrt{{{}}}", arg),
                "abs" => return write!(f, "\\left|{}\\right|", arg),
                "exp" => return write!(f, "e^{{{}}}", arg),
                _ => (),
            }
        }
        write!(f, "{} \\mathopen{{}}\\left({}\\right)\\mathclose{{}}", self.tex_name(), arg)
    }
}

impl Tex for Unary {
    fn fmt_tex(&self, f: &mut Formatter) -> Result {
        let operand = self.operand.tex();
        if self.op == UnaryOp::Recip {
            return write!(f, "\\frac{{1}}{{{}}}", operand);
        }

        let reciprocal_operand = matches!(&*self.operand, Expr::Unary(Unary { op: UnaryOp::Recip, .. }));
        if self.operand.kind() >= ExprKind::Unary
            && self.operand.precedence() <= self.op.precedence()
            && !(self.op == UnaryOp::Neg && reciprocal_operand)
        {
            write!(f, "{}\\left({}\\right)", self.op, operand)
        } else {
            write!(f, "{}{}", self.op, operand)
        }
    }
}

impl Binary {
    /// Returns the LaTeX operator written between the operands.
    fn tex_op(&self) -> &'static str {
        match self.op {
            BinOp::Mul => {
                let rhs_is_number = match &*self.rhs {
                    Expr::Scalar(_) => true,
                    Expr::Binary(Binary { op: BinOp::Pow, lhs, .. }) => lhs.kind() == ExprKind::Number,
                    _ => false,
                };
                if rhs_is_number { "\\cdot " } else { " " }
            },
            BinOp::Or => "\\hbox{ or }",
            BinOp::And => "\\hbox{ and }",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Eq => "=",
        }
    }

    fn tex_string(&self) -> String {
        let lhs = self.lhs.tex();
        let rhs = self.rhs.tex();
        match self.op {
            BinOp::Div => format!("\\frac{{{}}}{{{}}}", lhs, rhs),
            BinOp::Pow => {
                if self.lhs.kind() >= ExprKind::Function || is_negative_literal(&self.lhs) {
                    format!("\\left({}\\right)^{{{}}}", lhs, rhs)
                } else {
                    format!("{}^{{{}}}", lhs, rhs)
                }
            },
            _ => {
                let prec = self.op.precedence();
                let mut out = String::new();
                if self.lhs.kind() >= ExprKind::Unary && self.lhs.precedence() < prec {
                    out.push_str(&format!("\\left({}\\right)", lhs));
                } else {
                    out.push_str(&lhs.to_string());
                }
                out.push_str(self.tex_op());
                if self.rhs.kind() >= ExprKind::Unary && self.rhs.precedence() <= prec {
                    out.push_str(&format!("\\left({}\\right)", rhs));
                } else {
                    out.push_str(&rhs.to_string());
                }
                out
            },
        }
    }
}

impl Tex for Binary {
    fn fmt_tex(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.tex_string().replace("+-", "-"))
    }
}

impl Tex for Multi {
    fn fmt_tex(&self, f: &mut Formatter) -> Result {
        if self.operands.is_empty() {
            return write!(f, "{}", self.op.identity());
        }

        let prec = self.op.precedence();
        let op = match self.op {
            MultiOp::Add => "+",
            MultiOp::Mul => " ",
        };
        let mut out = String::new();
        for (i, operand) in self.operands.iter().enumerate() {
            match (self.op, operand) {
                (MultiOp::Mul, Expr::Unary(Unary { op: UnaryOp::Recip, operand: denom })) => {
                    let mut denom_str = denom.tex().to_string();
                    if denom.kind() >= ExprKind::Unary && denom.precedence() < prec {
                        denom_str = format!("\\left({}\\right)", denom_str);
                    }
                    if out.is_empty() {
                        out.push('1');
                    }
                    out = format!("\\frac{{{}}}{{{}}}", out, denom_str);
                },
                (MultiOp::Add, Expr::Unary(Unary { op: UnaryOp::Neg, .. })) => {
                    out.push_str(&operand.tex().to_string());
                },
                _ => {
                    let mut operand_str = operand.tex().to_string();
                    if (operand.kind() >= ExprKind::Unary && operand.precedence() <= prec)
                        || (i > 0 && self.op == MultiOp::Mul && operand.kind() == ExprKind::Number)
                    {
                        operand_str = format!("\\left({}\\right)", operand_str);
                    }
                    if i > 0 {
                        out.push_str(op);
                    }
                    out.push_str(&operand_str);
                },
            }
        }
        write!(f, "{}", out)
    }
}

impl Tex for Expr {
    fn fmt_tex(&self, f: &mut Formatter) -> Result {
        match self {
            Expr::Scalar(number) => write!(f, "{}", number.to_tex()),
            Expr::Variable(var) => var.fmt_tex(f),
            Expr::Index(index) => write!(f, "{}_{{{}}}", index.name, index.index.tex()),
            Expr::Unary(unary) => unary.fmt_tex(f),
            Expr::Binary(binary) => binary.fmt_tex(f),
            Expr::Multi(multi) => multi.fmt_tex(f),
            Expr::Function(function) => function.fmt_tex(f),
            Expr::Derivative(derivative) => {
                let var = Variable::new(derivative.var.as_str());
                let var = var.tex();
                match &derivative.at {
                    Some(at) => write!(
                        f,
                        "\\left. \\frac{{d}}{{d{}}} \\right|_{{{}={}}}\\Big[{}\\Big]",
                        var,
                        var,
                        at.tex(),
                        derivative.expr.tex(),
                    ),
                    None => write!(f, "\\frac{{d}}{{d{}}}\\Big[{}\\Big]", var, derivative.expr.tex()),
                }
            },
            Expr::Invalid(invalid) => match &invalid.partial {
                Some(partial) => partial.fmt_tex(f),
                None => write!(f, "?"),
            },
        }
    }
}

impl Expr {
    /// Formats the expression as LaTeX.
    pub fn to_tex(&self) -> String {
        self.tex().to_string()
    }

    /// Formats only the operation at the root of the expression as LaTeX, with the operands left
    /// out. Leaves are formatted in full.
    pub fn operator_tex(&self) -> String {
        match self {
            Expr::Scalar(_) | Expr::Variable(_) | Expr::Index(_) => self.to_tex(),
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Recip => "\\div".to_string(),
                op => op.to_string(),
            },
            Expr::Binary(binary) => match binary.op {
                BinOp::Mul => "\\times ".to_string(),
                BinOp::Div => "\\div ".to_string(),
                BinOp::Pow => "\\wedge ".to_string(),
                BinOp::Or => "\\hbox{ or }".to_string(),
                BinOp::And => "\\hbox{ and }".to_string(),
                op => op.to_string(),
            },
            Expr::Multi(multi) => match multi.op {
                MultiOp::Add => "+".to_string(),
                MultiOp::Mul => "\\times".to_string(),
            },
            Expr::Function(function) => format!("{}(\\Box)", function.tex_name()),
            Expr::Derivative(derivative) => format!("\\frac{{d}}{{d{}}}", derivative.var),
            Expr::Invalid(_) => "?".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::number::Number;
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn variables() {
        assert_eq!(Expr::var("theta").to_tex(), "\\theta");
        assert_eq!(Expr::var("inf").to_tex(), "\\infty");
        assert_eq!(Expr::var("e").to_tex(), "\\mathrm{e}");
        assert_eq!(Expr::var("input2").to_tex(), "\\boxed{\\dots?^{2}}");
    }

    #[test]
    fn reciprocal_and_quotient() {
        assert_eq!(Expr::unary(UnaryOp::Recip, x()).to_tex(), "\\frac{1}{x}");
        let expr = Expr::binary(BinOp::Div, x(), Expr::integer(2));
        assert_eq!(expr.to_tex(), "\\frac{x}{2}");
    }

    #[test]
    fn plus_minus_collapses() {
        let expr = Expr::binary(BinOp::Add, x(), Expr::integer(-3));
        assert_eq!(expr.to_tex(), "x-3");
    }

    #[test]
    fn power_of_function() {
        let expr = Expr::binary(BinOp::Pow, Expr::function("sin", x()), Expr::integer(2));
        assert_eq!(expr.to_tex(), "\\left(\\sin \\mathopen{}\\left(x\\right)\\mathclose{}\\right)^{2}");
    }

    #[test]
    fn products() {
        let expr = Expr::binary(BinOp::Mul, Expr::integer(3), x());
        assert_eq!(expr.to_tex(), "3 x");
        let expr = Expr::binary(BinOp::Mul, x(), Expr::integer(3));
        assert_eq!(expr.to_tex(), "x\\cdot 3");

        let expr = Expr::multi(MultiOp::Mul, vec![x(), Expr::unary(UnaryOp::Recip, Expr::var("y"))]);
        assert_eq!(expr.to_tex(), "\\frac{x}{y}");
    }

    #[test]
    fn functions() {
        assert_eq!(Expr::function("asin", x()).to_tex(), "\\sin^{-1} \\mathopen{}\\left(x\\right)\\mathclose{}");
        assert_eq!(Expr::function("sqrt", x()).to_tex(), "\\sqrt{x}");
        assert_eq!(Expr::function("f''''", x()).to_tex(), "f^{(4)} \\mathopen{}\\left(x\\right)\\mathclose{}");
        assert_eq!(Expr::number(Number::rational(-1, 2)).to_tex(), "-\\frac{1}{2}");
    }

    #[test]
    fn derivatives() {
        let expr = Expr::derivative(x(), "x", None);
        assert_eq!(expr.to_tex(), "\\frac{d}{dx}\\Big[x\\Big]");
        let expr = Expr::derivative(x(), "x", Some(Expr::integer(1)));
        assert_eq!(expr.to_tex(), "\\left. \\frac{d}{dx} \\right|_{x=1}\\Big[x\\Big]");
    }

    #[test]
    fn operators_only() {
        assert_eq!(Expr::binary(BinOp::Mul, x(), x()).operator_tex(), "\\times ");
        assert_eq!(Expr::function("ln", x()).operator_tex(), "\\ln(\\Box)");
    }
}
