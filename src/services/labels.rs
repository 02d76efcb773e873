// src/services/labels.rs

/// Languages the generated documents and exports are available in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Ru,
}

impl Lang {
    /// Matches on the primary subtag: "ru-RU" -> Ru. Unsupported languages give `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.split('-').next().map(str::to_ascii_lowercase).as_deref() {
            Some("ru") => Some(Lang::Ru),
            Some("en") => Some(Lang::En),
            _ => None,
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Lang::En => &EN,
            Lang::Ru => &RU,
        }
    }
}

pub struct Labels {
    // tables
    pub number: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub quantity: &'static str,
    pub unit_price: &'static str,
    pub total: &'static str,
    pub price: &'static str,
    pub delivery: &'static str,
    pub supplier: &'static str,
    pub status: &'static str,

    // comparison export
    pub comparison_sheet: &'static str,

    // documents
    pub tender: &'static str,
    pub lot: &'static str,
    pub invitation_title: &'static str,
    pub submission_deadline: &'static str,
    pub invitation_text: &'static str,
    pub quote_form_title: &'static str,
    pub protocol_title: &'static str,
    pub no_quotes: &'static str,
    pub date_format: &'static str,
}

static EN: Labels = Labels {
    number: "No.",
    name: "Name",
    unit: "Unit",
    quantity: "Quantity",
    unit_price: "Unit price",
    total: "Total",
    price: "Price",
    delivery: "Delivery (days)",
    supplier: "Supplier",
    status: "Status",
    comparison_sheet: "Quote comparison",
    tender: "Tender No.",
    lot: "Lot",
    invitation_title: "INVITATION TO TENDER",
    submission_deadline: "Submission deadline",
    invitation_text: "We invite you to take part in this tender.",
    quote_form_title: "COMMERCIAL OFFER FORM",
    protocol_title: "BID EVALUATION PROTOCOL",
    no_quotes: "No quotes received.",
    date_format: "%Y-%m-%d",
};

static RU: Labels = Labels {
    number: "№",
    name: "Наименование",
    unit: "Ед. изм.",
    quantity: "Количество",
    unit_price: "Цена за ед.",
    total: "Сумма",
    price: "Цена",
    delivery: "Срок",
    supplier: "Поставщик",
    status: "Статус",
    comparison_sheet: "Сравнение КП",
    tender: "Тендер №",
    lot: "Лот",
    invitation_title: "ПРИГЛАШЕНИЕ К УЧАСТИЮ В ТЕНДЕРЕ",
    submission_deadline: "Срок подачи заявок",
    invitation_text: "Приглашаем Вас принять участие в данном тендере.",
    quote_form_title: "ФОРМА КОММЕРЧЕСКОГО ПРЕДЛОЖЕНИЯ",
    protocol_title: "ПРОТОКОЛ РАССМОТРЕНИЯ ЗАЯВОК",
    no_quotes: "Предложения не поступали.",
    date_format: "%d.%m.%Y",
};
