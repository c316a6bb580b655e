use rust_decimal::Decimal;
use tracing::{debug, error, instrument};

use crate::encoding::Encoding;
use crate::error::FormatResult;
use crate::escpos::EscPosBuilder;
use crate::layout::{
    CURRENCY, LayoutParams, fit_column, format_fixed, format_grouped, pad, text_width,
    truncate_ellipsis, wrap_words,
};

use super::model::{ChangeStatus, ItemKind, LineItem, ReceiptDocument, ReceiptType};

/// Column header of item tables
const TABLE_HEADER: &str = "Art.  Qté Px    Total";

/// Width of the label column in amount lines
const AMOUNT_LABEL_WIDTH: usize = 13;

/// Width of the amount column in amount lines
const AMOUNT_WIDTH: usize = 12;

/// Receipt-number prefixes and the document label they imply
const NUMBER_PREFIX_LABELS: [(&str, &str); 3] = [
    ("RES-", "RÉSERVATION"),
    ("ORD-", "COMMANDE"),
    ("HTL-", "HÔTEL"),
];

/// How a section prints its items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemStyle {
    /// Name, quantity, unit price, line total in fixed columns
    Table,
    /// Wrapped name, then an indented "qty unit x price" line
    Detailed,
    /// One line per item, name shortened to fit
    Compact { show_quantity: bool },
}

/// A titled group of items with its subtotal line
struct Section<'s> {
    title: &'static str,
    style: ItemStyle,
    subtotal_label: &'static str,
    items: Vec<&'s LineItem>,
}

/// Build the printable byte buffer for a receipt
///
/// The receipt is validated first; nothing is rendered for an invalid one.
#[instrument(skip(receipt, layout), fields(items = receipt.items.len(), width = %layout.printer_width))]
pub fn build_document(
    receipt: &ReceiptDocument,
    receipt_type: ReceiptType,
    layout: LayoutParams,
    encoding: Encoding,
) -> FormatResult<Vec<u8>> {
    if let Err(e) = receipt.validate() {
        error!(error = %e, "receipt rejected");
        return Err(e);
    }

    let data = ReceiptRenderer::new(receipt, receipt_type, layout, encoding).render();
    debug!(bytes = data.len(), "receipt rendered");
    Ok(data)
}

/// Parse a JSON payload and build it
///
/// Unknown receipt type names fall back to the standard layout.
pub fn build_document_json(
    payload: &str,
    receipt_type: &str,
    layout: LayoutParams,
    encoding: Encoding,
) -> FormatResult<Vec<u8>> {
    let receipt = ReceiptDocument::from_json(payload).inspect_err(|e| {
        error!(error = %e, "receipt payload rejected");
    })?;
    build_document(
        &receipt,
        ReceiptType::parse_lenient(receipt_type),
        layout,
        encoding,
    )
}

pub struct ReceiptRenderer<'a> {
    receipt: &'a ReceiptDocument,
    receipt_type: ReceiptType,
    layout: LayoutParams,
    encoding: Encoding,
}

impl<'a> ReceiptRenderer<'a> {
    pub fn new(
        receipt: &'a ReceiptDocument,
        receipt_type: ReceiptType,
        layout: LayoutParams,
        encoding: Encoding,
    ) -> Self {
        Self {
            receipt,
            receipt_type,
            layout,
            encoding,
        }
    }

    pub fn render(&self) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.layout.max_width, self.encoding);

        self.render_header(&mut b);
        self.render_room_info(&mut b);

        match self.receipt_type {
            ReceiptType::Hotel => self.render_hotel_items(&mut b),
            ReceiptType::Mixed => self.render_mixed_items(&mut b),
            ReceiptType::Standard | ReceiptType::Food | ReceiptType::Drink => {
                self.render_standard_items(&mut b)
            }
        }

        self.render_payment(&mut b);
        self.render_change(&mut b);
        self.render_closing(&mut b);

        b.newlines(3);
        b.cut();
        b.build()
    }

    fn fit(&self, s: &str) -> String {
        truncate_ellipsis(s, self.layout.max_width)
    }

    // === Header ===

    fn render_header(&self, b: &mut EscPosBuilder) {
        if let Some(header) = &self.receipt.header {
            b.center();
            if let Some(name) = non_empty(&header.business_name) {
                b.bold().double_height();
                b.line(&self.fit(name));
                b.reset_size().bold_off();
            }
            if let Some(address) = non_empty(&header.address) {
                b.line(&self.fit(address));
            }
            if let Some(phone) = non_empty(&header.phone) {
                b.line(&self.fit(&format!("Tél: {}", phone)));
            }
            b.bold_line(&self.fit(&self.document_label()));
            b.left();

            if let Some(number) = non_empty(&header.receipt_number) {
                b.line(&self.fit(&format!("Reçu #: {}", number)));
            }
            if let Some(date) = non_empty(&header.date) {
                b.line(&self.fit(&format!("Date: {}", date)));
            }
        }

        if let Some(client) = non_empty(&self.receipt.client_info) {
            b.left();
            b.line(&self.fit(client));
        }
    }

    /// Explicit order type, else receipt-number prefix, else receipt type
    fn document_label(&self) -> String {
        let header = self.receipt.header.as_ref();

        if let Some(order_type) = header.and_then(|h| non_empty(&h.order_type)) {
            return order_type.to_string();
        }

        if let Some(number) = header.and_then(|h| non_empty(&h.receipt_number))
            && let Some((_, label)) = NUMBER_PREFIX_LABELS
                .iter()
                .find(|(prefix, _)| number.starts_with(prefix))
        {
            return label.to_string();
        }

        match self.receipt_type {
            ReceiptType::Hotel => "RÉSERVATION".to_string(),
            ReceiptType::Mixed => "RÉSERVATION & CONSO".to_string(),
            _ => "REÇU".to_string(),
        }
    }

    fn render_room_info(&self, b: &mut EscPosBuilder) {
        let Some(room_info) = non_empty(&self.receipt.room_info) else {
            return;
        };
        b.left();
        for line in room_info.lines().map(str::trim).filter(|l| !l.is_empty()) {
            b.line_crlf(line);
        }
        b.line_crlf(&"-".repeat(self.layout.max_width));
    }

    // === Item layouts ===

    fn render_standard_items(&self, b: &mut EscPosBuilder) {
        if self.receipt.items.is_empty() {
            return;
        }
        self.render_table_header(b);
        for item in &self.receipt.items {
            self.render_item(b, item, ItemStyle::Table);
        }
        b.sep_single();
        b.bold_line(&amount_line("TOTAL:", self.receipt.items_total()));
    }

    fn render_hotel_items(&self, b: &mut EscPosBuilder) {
        let items = &self.receipt.items;
        let sections = [
            Section {
                title: "DÉTAILS HÉBERGEMENT",
                style: ItemStyle::Detailed,
                subtotal_label: "Sous-total:",
                items: items
                    .iter()
                    .filter(|i| i.kind == ItemKind::Accommodation)
                    .collect(),
            },
            Section {
                title: "RESTAURATION",
                style: ItemStyle::Compact {
                    show_quantity: true,
                },
                subtotal_label: "Sous-total:",
                items: items.iter().filter(|i| i.is_restaurant_food()).collect(),
            },
            Section {
                title: "EXTRAS",
                style: ItemStyle::Compact {
                    show_quantity: false,
                },
                subtotal_label: "Sous-total:",
                items: items
                    .iter()
                    .filter(|i| i.kind != ItemKind::Accommodation && !i.is_restaurant_food())
                    .collect(),
            },
        ];

        for section in &sections {
            self.render_section(b, section);
        }

        let mut total = self.receipt.items_total();
        let discount = self.receipt.stats_discount();
        if discount > Decimal::ZERO {
            b.line(&amount_line("Remise:", -discount));
            total -= discount;
        }

        b.sep_single();
        b.bold_line(&amount_line("TOTAL:", total));
    }

    fn render_mixed_items(&self, b: &mut EscPosBuilder) {
        let items = &self.receipt.items;
        let of_kind = |kind: ItemKind| items.iter().filter(move |i| i.kind == kind);

        let room = Section {
            title: "HÉBERGEMENT",
            style: ItemStyle::Detailed,
            subtotal_label: "Hébergement:",
            items: of_kind(ItemKind::Accommodation).collect(),
        };
        let consumption = Section {
            title: "CONSOMMATIONS",
            style: ItemStyle::Table,
            subtotal_label: "Consommation:",
            items: of_kind(ItemKind::Food)
                .chain(of_kind(ItemKind::Drink))
                .collect(),
        };
        let extras = Section {
            title: "EXTRAS",
            style: ItemStyle::Compact {
                show_quantity: false,
            },
            subtotal_label: "Extras:",
            items: of_kind(ItemKind::Other).collect(),
        };

        let room_total = self.render_section(b, &room);
        let consumption_total = self.render_section(b, &consumption);
        let extras_total = self.render_section(b, &extras);

        // Discounts count once each, whatever their quantity
        let discount_total: Decimal = of_kind(ItemKind::Discount)
            .map(LineItem::unit_price)
            .sum();
        if !discount_total.is_zero() {
            b.line(&amount_line("Remise:", discount_total));
        }

        b.bold_line("RÉCAPITULATIF");
        b.sep_single();
        let recap = [
            ("Hébergement:", room_total),
            ("Consommation:", consumption_total),
            ("Extras:", extras_total),
        ];
        for (label, amount) in recap {
            if amount > Decimal::ZERO {
                b.line(&amount_line(label, amount));
            }
        }
        if !discount_total.is_zero() {
            b.line(&amount_line("Remise:", discount_total));
        }
        b.sep_single();

        let grand_total = room_total + consumption_total + extras_total + discount_total;
        b.bold_line(&amount_line("TOTAL:", grand_total));
    }

    /// Print one section and return its subtotal; empty sections print nothing
    fn render_section(&self, b: &mut EscPosBuilder, section: &Section<'_>) -> Decimal {
        if section.items.is_empty() {
            return Decimal::ZERO;
        }

        b.bold_line(section.title);
        b.sep_single();
        if section.style == ItemStyle::Table {
            self.render_table_header(b);
        }
        for item in &section.items {
            self.render_item(b, item, section.style);
        }
        b.sep_single();

        let subtotal: Decimal = section.items.iter().map(|i| i.total()).sum();
        b.line(&amount_line(section.subtotal_label, subtotal));
        b.newline();
        subtotal
    }

    fn render_table_header(&self, b: &mut EscPosBuilder) {
        b.bold_line(TABLE_HEADER);
        b.sep_single();
    }

    fn render_item(&self, b: &mut EscPosBuilder, item: &LineItem, style: ItemStyle) {
        let max_width = self.layout.max_width;
        match style {
            ItemStyle::Table => {
                b.line(&format!(
                    "{} {:>2} {:>5} {:>7}",
                    fit_column(&item.name, self.layout.article_name_width),
                    item.quantity,
                    format_fixed(item.unit_price()),
                    format_fixed(item.total()),
                ));
            }
            ItemStyle::Detailed => {
                if text_width(&item.name) > max_width {
                    for (idx, part) in wrap_words(&item.name, max_width - 2).iter().enumerate() {
                        if idx == 0 {
                            b.line(part);
                        } else {
                            b.line(&format!("  {}", part));
                        }
                    }
                } else {
                    b.line(&item.name);
                }
                b.line(&self.fit(&format!(
                    "  {} {} x {} {}/nuit",
                    item.quantity,
                    item.quantity_unit(),
                    format_grouped(item.unit_price()),
                    CURRENCY,
                )));
            }
            ItemStyle::Compact { show_quantity } => {
                let suffix = if show_quantity {
                    format!(
                        " ({}) {} {}",
                        item.quantity,
                        format_grouped(item.total()),
                        CURRENCY
                    )
                } else {
                    format!(": {} {}", format_grouped(item.total()), CURRENCY)
                };
                let room = max_width.saturating_sub(text_width(&suffix));
                let name = truncate_ellipsis(&item.name, room);
                b.line(&format!("{}{}", name, suffix));
            }
        }
    }

    // === Footer ===

    fn render_payment(&self, b: &mut EscPosBuilder) {
        let Some(footer) = &self.receipt.footer else {
            return;
        };
        b.left();
        if let Some(method) = non_empty(&footer.payment_method) {
            b.line(&self.fit(&format!("Mode: {}", method)));
        }
        if let Some(status) = non_empty(&footer.payment_status) {
            b.line(&self.fit(status));
        }
    }

    fn render_change(&self, b: &mut EscPosBuilder) {
        let Some(change) = &self.receipt.change_info else {
            return;
        };

        b.left();
        b.sep_double();
        b.bold();
        b.center_line("INFORMATION MONNAIE");
        b.bold_off();
        b.line(&self.fit(&format!("Montant: {}", change.formatted_amount)));
        b.bold_line(&self.fit(&format!("Statut: {}", change.status_label())));

        if change.change_given
            && let Some(at) = non_empty(&change.change_given_at)
        {
            b.line(&self.fit(&format!("Rendue le: {}", at)));
        }

        if change.status == ChangeStatus::Pending {
            b.center().bold();
            b.line("ATTENTION");
            b.line("MONNAIE À RENDRE");
            b.bold_off().left();
        }
        b.sep_double();
    }

    fn render_closing(&self, b: &mut EscPosBuilder) {
        let Some(footer) = &self.receipt.footer else {
            return;
        };
        b.newline();
        b.center();
        let messages = [
            &footer.thank_you_message,
            &footer.additional_message,
            &footer.website,
        ];
        for message in messages.into_iter().filter_map(non_empty) {
            b.line(&self.fit(message));
        }
        b.left();
    }
}

/// `label` left in its column, amount right-aligned, then the currency
fn amount_line(label: &str, amount: Decimal) -> String {
    format!(
        "{}{} {}",
        pad(label, AMOUNT_LABEL_WIDTH, false),
        pad(&format_grouped(amount), AMOUNT_WIDTH, true),
        CURRENCY
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escpos::preview_text;
    use crate::receipt::model::{ChangeInfo, ReceiptFooter, ReceiptHeader, ReceiptStats};
    use crate::resolver::PrinterWidth;

    fn render(receipt: &ReceiptDocument, receipt_type: ReceiptType) -> String {
        let data = build_document(
            receipt,
            receipt_type,
            LayoutParams::for_width(PrinterWidth::Mm58),
            Encoding::Ascii,
        )
        .unwrap();
        preview_text(&data)
    }

    #[test]
    fn test_amount_line() {
        assert_eq!(
            amount_line("TOTAL:", Decimal::from(25)),
            "TOTAL:                 25 FCFA"
        );
        assert_eq!(
            amount_line("Remise:", Decimal::from(-1500)),
            "Remise:            -1,500 FCFA"
        );
    }

    #[test]
    fn test_document_label() {
        let layout = LayoutParams::default();
        let mut receipt = ReceiptDocument {
            header: Some(ReceiptHeader {
                receipt_number: Some("ORD-42".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let r = ReceiptRenderer::new(&receipt, ReceiptType::Hotel, layout, Encoding::Ascii);
        assert_eq!(r.document_label(), "COMMANDE");

        receipt.header.as_mut().unwrap().order_type = Some("FACTURE".into());
        let r = ReceiptRenderer::new(&receipt, ReceiptType::Hotel, layout, Encoding::Ascii);
        assert_eq!(r.document_label(), "FACTURE");

        receipt.header.as_mut().unwrap().order_type = None;
        for (number, label) in [("RES-0012", "RÉSERVATION"), ("HTL-7", "HÔTEL"), ("XYZ-1", "REÇU")] {
            receipt.header.as_mut().unwrap().receipt_number = Some(number.into());
            let r = ReceiptRenderer::new(&receipt, ReceiptType::Standard, layout, Encoding::Ascii);
            assert_eq!(r.document_label(), label);
        }

        receipt.header = None;
        let r = ReceiptRenderer::new(&receipt, ReceiptType::Mixed, layout, Encoding::Ascii);
        assert_eq!(r.document_label(), "RÉSERVATION & CONSO");
        let r = ReceiptRenderer::new(&receipt, ReceiptType::Food, layout, Encoding::Ascii);
        assert_eq!(r.document_label(), "REÇU");
    }

    #[test]
    fn test_standard_rows() {
        let receipt = ReceiptDocument {
            items: vec![
                LineItem::new("Café", 2, 2.5, ItemKind::Drink),
                LineItem::new("Croissant au beurre AOP", 1, 20.0, ItemKind::Food),
            ],
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Standard);
        assert!(text.starts_with("Art.  Qte Px    Total\n----"));
        assert!(text.contains("Cafe            2     2       5"));
        assert!(text.contains("Croissant au .  1    20      20"));
        assert!(text.contains("TOTAL:                 25 FCFA"));
    }

    #[test]
    fn test_standard_without_items_has_no_table() {
        let receipt = ReceiptDocument {
            header: Some(ReceiptHeader {
                business_name: Some("Chez Awa".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Standard);
        assert!(!text.contains("Art."));
        assert!(!text.contains("TOTAL:"));
        assert!(!text.contains("---"));
    }

    #[test]
    fn test_header_order() {
        let receipt = ReceiptDocument {
            header: Some(ReceiptHeader {
                business_name: Some("Hôtel du Lac".into()),
                address: Some("Rue 5, Plateau".into()),
                phone: Some("77 000 00 00".into()),
                receipt_number: Some("RES-0012".into()),
                date: Some("01/10/2026".into()),
                order_type: None,
            }),
            client_info: Some("Client: Awa Diop".into()),
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Standard);
        let lines: Vec<&str> = text.lines().take(7).collect();
        assert_eq!(
            lines,
            vec![
                "Hotel du Lac",
                "Rue 5, Plateau",
                "Tel: 77 000 00 00",
                "RESERVATION",
                "Recu #: RES-0012",
                "Date: 01/10/2026",
                "Client: Awa Diop",
            ]
        );
    }

    #[test]
    fn test_room_info_block() {
        let receipt = ReceiptDocument {
            room_info: Some("Chambre 12\n\n   \n  Du 01/10 au 03/10  \r\n".into()),
            ..Default::default()
        };
        let data = build_document(
            &receipt,
            ReceiptType::Standard,
            LayoutParams::for_width(PrinterWidth::Mm58),
            Encoding::Ascii,
        )
        .unwrap();

        let mut expected = b"Chambre 12\r\nDu 01/10 au 03/10\r\n".to_vec();
        expected.extend_from_slice(&[b'-'; 32]);
        expected.extend_from_slice(b"\r\n");
        assert!(data.windows(expected.len()).any(|w| w == expected.as_slice()));
        assert!(!data.windows(4).any(|w| w == b"\r\n\r\n"));
    }

    #[test]
    fn test_mixed_discount_counts_unit_price() {
        let receipt = ReceiptDocument {
            items: vec![
                LineItem::new("Chambre 7", 1, 100.0, ItemKind::Accommodation),
                LineItem::new("Remise", 2, -15.0, ItemKind::Discount),
            ],
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Mixed);
        assert!(text.contains(&amount_line("Remise:", Decimal::from(-15))));
        assert!(text.contains(&amount_line("TOTAL:", Decimal::from(85))));
    }

    #[test]
    fn test_hotel_sections_and_discount() {
        let receipt = ReceiptDocument {
            items: vec![
                LineItem::new("Chambre Deluxe vue sur le lac avec terrasse", 2, 15000.0, ItemKind::Accommodation),
                LineItem::new("Dîner", 1, 5000.0, ItemKind::Food).with_category("Restaurant"),
                LineItem::new("Blanchisserie", 1, 2000.0, ItemKind::Other),
            ],
            stats: Some(ReceiptStats {
                discount_amount: 1500.0,
            }),
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Hotel);
        assert!(text.contains("DETAILS HEBERGEMENT"));
        assert!(text.contains("  2 nuit(s) x 15,000 FCFA/nuit"));
        assert!(text.contains("RESTAURATION"));
        assert!(text.contains("Diner (1) 5,000 FCFA"));
        assert!(text.contains("Blanchisserie: 2,000 FCFA"));
        assert!(text.contains("Remise:            -1,500 FCFA"));
        assert!(text.contains("TOTAL:             35,500 FCFA"));
        for line in text.lines() {
            assert!(text_width(line) <= 32, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn test_change_block_pending() {
        let receipt = ReceiptDocument {
            change_info: Some(ChangeInfo {
                formatted_amount: "2 500 FCFA".into(),
                status: ChangeStatus::Pending,
                ..Default::default()
            }),
            footer: Some(ReceiptFooter {
                payment_method: Some("Espèces".into()),
                thank_you_message: Some("Merci de votre visite".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Standard);
        assert!(text.contains("Mode: Especes"));
        assert!(text.contains("INFORMATION MONNAIE"));
        assert!(text.contains("Montant: 2 500 FCFA"));
        assert!(text.contains("Statut: En attente"));
        assert!(text.contains("ATTENTION\nMONNAIE A RENDRE"));
        assert!(text.contains("Merci de votre visite"));
        assert!(!text.contains("Rendue le"));
    }

    #[test]
    fn test_change_block_given() {
        let mut receipt = ReceiptDocument {
            change_info: Some(ChangeInfo {
                formatted_amount: "1 000 FCFA".into(),
                status: ChangeStatus::Settled,
                change_given: true,
                change_given_at: Some("01/10/2026 14:05".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Standard);
        assert!(text.contains("Statut: Rendue\nRendue le: 01/10/2026 14:05\n"));
        assert!(!text.contains("ATTENTION"));

        receipt.change_info.as_mut().unwrap().change_given = false;
        let text = render(&receipt, ReceiptType::Standard);
        assert!(!text.contains("Rendue le"));
    }

    #[test]
    fn test_restaurant_category_is_case_sensitive() {
        let receipt = ReceiptDocument {
            items: vec![LineItem::new("Dîner", 1, 5000.0, ItemKind::Food).with_category("restaurant")],
            ..Default::default()
        };
        let text = render(&receipt, ReceiptType::Hotel);
        assert!(!text.contains("RESTAURATION"));
        assert!(text.contains("EXTRAS\n"));
        assert!(text.contains("Diner: 5,000 FCFA"));
    }

    #[test]
    fn test_invalid_receipt_renders_nothing() {
        let receipt = ReceiptDocument {
            items: vec![LineItem::new("Café", 1, f64::INFINITY, ItemKind::Drink)],
            ..Default::default()
        };
        let result = build_document(
            &receipt,
            ReceiptType::Standard,
            LayoutParams::default(),
            Encoding::Ascii,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_trailer() {
        let data = build_document(
            &ReceiptDocument::default(),
            ReceiptType::Standard,
            LayoutParams::default(),
            Encoding::Ascii,
        )
        .unwrap();
        assert!(data.ends_with(b"\n\n\n\x1D\x56\x00"));
    }
}
