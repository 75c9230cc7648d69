//! Content MathML formatting of expressions.

use super::{BinOp, Expr, MultiOp, UnaryOp};

/// Returns the MathML element naming a builtin function.
fn function_element(name: &str) -> Option<&'static str> {
    Some(match name {
        "sin" => "<sin/>",
        "cos" => "<cos/>",
        "tan" => "<tan/>",
        "csc" => "<csc/>",
        "sec" => "<sec/>",
        "cot" => "<cot/>",
        "arcsin" => "<arcsin/>",
        "arccos" => "<arccos/>",
        "arctan" => "<arctan/>",
        "arcsec" => "<arcsec/>",
        "arccsc" => "<arccsc/>",
        "arccot" => "<arccot/>",
        "abs" => "<abs/>",
        "exp" | "expb" => "<exp/>",
        "ln" => "<ln/>",
        _ => return None,
    })
}

fn apply(head: &str, operands: &[&Expr]) -> String {
    let mut out = format!("<apply>{}", head);
    for operand in operands {
        out.push_str(&operand.to_mathml());
    }
    out.push_str("</apply>");
    out
}

impl Expr {
    /// Formats the expression as content MathML.
    pub fn to_mathml(&self) -> String {
        match self {
            Expr::Scalar(number) => number.to_mathml(),
            Expr::Variable(var) => format!("<ci>{}</ci>", var.name),
            Expr::Index(index) => format!(
                "<apply><selector/><ci>{}</ci>{}</apply>",
                index.name,
                index.index.to_mathml(),
            ),
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Plus => unary.operand.to_mathml(),
                UnaryOp::Neg => apply("<minus/>", &[&unary.operand]),
                UnaryOp::Recip => format!("<apply><divide/><cn>1</cn>{}</apply>", unary.operand.to_mathml()),
            },
            Expr::Binary(binary) => {
                let head = match binary.op {
                    BinOp::Add => "<plus/>",
                    BinOp::Sub => "<minus/>",
                    BinOp::Mul => "<times/>",
                    BinOp::Div => "<divide/>",
                    BinOp::Pow => "<power/>",
                    BinOp::Eq => "<eq/>",
                    BinOp::And => "<and/>",
                    BinOp::Or => "<or/>",
                };
                apply(head, &[&binary.lhs, &binary.rhs])
            },
            Expr::Multi(multi) => {
                let head = match multi.op {
                    MultiOp::Add => "<plus/>",
                    MultiOp::Mul => "<times/>",
                };
                let operands = multi.operands.iter().collect::<Vec<_>>();
                apply(head, &operands)
            },
            Expr::Function(function) => {
                let arg = function.arg.to_mathml();
                let head = match (function.derivs, function.name.as_str()) {
                    (0, "sqrt") => return format!("<apply><root/>{}</apply>", arg),
                    (0, "log10") => {
                        return format!("<apply><log/><logbase><cn>10</cn></logbase>{}</apply>", arg);
                    },
                    (0, name) => match function_element(name) {
                        Some(element) => element.to_string(),
                        None => format!("<ci>{}</ci>", name),
                    },
                    _ => format!("<ci>{}</ci>", function.full_name()),
                };
                format!("<apply>{}{}</apply>", head, arg)
            },
            Expr::Derivative(derivative) => {
                let mut out = format!(
                    "<apply><diff/><bvar><ci>{}</ci></bvar>{}</apply>",
                    derivative.var,
                    derivative.expr.to_mathml(),
                );
                if let Some(at) = &derivative.at {
                    out = format!(
                        "<apply><ci>eval</ci>{}<apply><eq/><ci>{}</ci>{}</apply></apply>",
                        out,
                        derivative.var,
                        at.to_mathml(),
                    );
                }
                out
            },
            Expr::Invalid(invalid) => match &invalid.partial {
                Some(partial) => partial.to_mathml(),
                None => "<merror/>".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn arithmetic() {
        let expr = Expr::binary(BinOp::Pow, Expr::var("x"), Expr::integer(2));
        assert_eq!(expr.to_mathml(), "<apply><power/><ci>x</ci><cn>2</cn></apply>");

        let expr = Expr::unary(UnaryOp::Recip, Expr::var("x"));
        assert_eq!(expr.to_mathml(), "<apply><divide/><cn>1</cn><ci>x</ci></apply>");
    }

    #[test]
    fn functions() {
        let expr = Expr::function("sqrt", Expr::var("x"));
        assert_eq!(expr.to_mathml(), "<apply><root/><ci>x</ci></apply>");

        let expr = Expr::function("f'", Expr::var("x"));
        assert_eq!(expr.to_mathml(), "<apply><ci>f'</ci><ci>x</ci></apply>");
    }
}
