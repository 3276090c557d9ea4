use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// 2^53: largest range where every whole number of cents is an exact f64.
const EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Fixed strings printed on every voucher.
#[derive(Clone, Copy, Debug)]
pub struct Labels {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub client_heading: &'static str,
    pub customer_name: &'static str,
    pub customer_tax_id: &'static str,
    pub store: &'static str,
    pub mall: &'static str,
    pub purchase_value: &'static str,
    pub attribution_date: &'static str,
    pub closer: &'static str,
}

const PT_BR: Labels = Labels {
    title: "Cupom Premiado",
    subtitle: "Comprovante de participação",
    client_heading: "Dados do cliente",
    customer_name: "Cliente",
    customer_tax_id: "CPF",
    store: "Loja",
    mall: "Shopping",
    purchase_value: "Valor da compra",
    attribution_date: "Data de atribuição",
    closer: "Boa sorte!",
};

const EN_US: Labels = Labels {
    title: "Awarded Voucher",
    subtitle: "Proof of participation",
    client_heading: "Client information",
    customer_name: "Customer",
    customer_tax_id: "Tax ID",
    store: "Store",
    mall: "Mall",
    purchase_value: "Purchase value",
    attribution_date: "Attribution date",
    closer: "Good luck!",
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::PtBr => &PT_BR,
            Locale::EnUs => &EN_US,
        }
    }

    /// Substituted for every missing text field.
    pub fn not_available(self) -> &'static str {
        match self {
            Locale::PtBr => "Não informado",
            Locale::EnUs => "N/A",
        }
    }

    fn separators(self) -> (char, char) {
        match self {
            Locale::PtBr => ('.', ','),
            Locale::EnUs => (',', '.'),
        }
    }

    /// Two fractional digits, thousands grouping and the currency symbol.
    pub fn format_currency(self, value: f64) -> String {
        if !value.is_finite() {
            return self.not_available().to_string();
        }
        let abs = value.abs();
        // Below 2^53 cents the integer path is exact; above it, print the
        // float's own decimal expansion instead of saturating a cast.
        let (whole, frac) = if abs * 100.0 < EXACT_CENTS {
            let cents = (abs * 100.0).round() as u64;
            ((cents / 100).to_string(), format!("{:02}", cents % 100))
        } else {
            let fixed = format!("{abs:.2}");
            match fixed.split_once('.') {
                Some((w, f)) => (w.to_string(), f.to_string()),
                None => (fixed, "00".to_string()),
            }
        };
        let (group, decimal) = self.separators();
        let whole = group_digits(&whole, group);
        let is_zero = whole == "0" && frac == "00";
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };
        match self {
            Locale::PtBr => format!("{sign}R$ {whole}{decimal}{frac}"),
            Locale::EnUs => format!("{sign}${whole}{decimal}{frac}"),
        }
    }

    pub fn format_date(self, at: &NaiveDateTime) -> String {
        match self {
            Locale::PtBr => at.format("%d/%m/%Y").to_string(),
            Locale::EnUs => at.format("%m/%d/%Y").to_string(),
        }
    }
}

fn group_digits(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}
