//! Sale row import: matched by `external_id`

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;

/// Columns a sale row must carry
pub const SALE_KEYS: &[&str] = &[
    "amount",
    "currency",
    "client",
    "brand",
    "external_id",
    "sale_date_from",
    "sale_date_to",
];

/// Validated sale row
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub external_id: Uuid,
    pub client: Uuid,
    pub amount: BigDecimal,
    pub currency: Currency,
    pub brand: Option<String>,
    pub sale_date_from: NaiveDate,
    pub sale_date_to: NaiveDate,
}

/// Imports sale rows
#[derive(Debug, Clone)]
pub struct SaleImport {
    today: NaiveDate,
}

impl SaleImport {
    /// `today` is the date sale periods are checked against
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

#[async_trait]
impl<S: RecordStore> EntityImport<S> for SaleImport {
    type Draft = SaleDraft;

    fn kind(&self) -> EntityKind {
        EntityKind::Sale
    }

    fn required_keys(&self) -> &'static [&'static str] {
        SALE_KEYS
    }

    async fn validate_row_data(
        &self,
        store: &S,
        row: &ImportRow,
    ) -> ImportResult<RowValidation<SaleDraft>> {
        let mut errors = Vec::new();

        let client_name = row.field("client");
        let client = collect(
            resolve_unique(
                store.clients_by_name(client_name).await?,
                "Client",
                "name",
                client_name,
            ),
            &mut errors,
        );

        let from = collect(parse_date("sale_date_from", row.field("sale_date_from")), &mut errors);
        let to = collect(parse_date("sale_date_to", row.field("sale_date_to")), &mut errors);
        if let (Some(from), Some(to)) = (from, to) {
            if let Err(messages) = validate_sale_period(from, to, self.today) {
                errors.extend(messages);
            }
        }

        let amount = collect(parse_amount(row.field("amount")), &mut errors);
        let currency = collect(row.field("currency").parse::<Currency>(), &mut errors);
        let external_id = collect(parse_external_id(row.field("external_id")), &mut errors);

        let brand = match row.field("brand") {
            "" => None,
            brand => Some(brand.to_string()),
        };

        match (client, from, to, amount, currency, external_id) {
            (Some(client), Some(from), Some(to), Some(amount), Some(currency), Some(external_id))
                if errors.is_empty() =>
            {
                Ok(Ok(SaleDraft {
                    external_id,
                    client: client.uuid,
                    amount,
                    currency,
                    brand,
                    sale_date_from: from,
                    sale_date_to: to,
                }))
            }
            _ => Ok(Err(errors)),
        }
    }

    async fn reconcile(&self, store: &mut S, draft: SaleDraft) -> ImportResult<Reconciliation> {
        let Some(mut sale) = store.find_sale_by_external_id(&draft.external_id).await? else {
            let sale = Sale {
                uuid: Uuid::new_v4(),
                client: Some(draft.client),
                amount: draft.amount,
                currency: draft.currency,
                brand: draft.brand,
                sale_date_from: draft.sale_date_from,
                sale_date_to: draft.sale_date_to,
                created_date: chrono::Utc::now().date_naive(),
                external_id: Some(draft.external_id),
            };
            store.save_sale(&sale).await?;
            store
                .replace_sale_months(&sale.uuid, &sale.monthly_breakdown())
                .await?;
            debug!(external_id = %draft.external_id, "sale created");
            return Ok(Reconciliation::Created);
        };

        let mut changed = Vec::new();
        if sale.amount != draft.amount {
            sale.amount = draft.amount;
            changed.push("amount");
        }
        if sale.currency != draft.currency {
            sale.currency = draft.currency;
            changed.push("currency");
        }
        if sale.sale_date_from != draft.sale_date_from {
            sale.sale_date_from = draft.sale_date_from;
            changed.push("sale_date_from");
        }
        if sale.sale_date_to != draft.sale_date_to {
            sale.sale_date_to = draft.sale_date_to;
            changed.push("sale_date_to");
        }

        if changed.is_empty() {
            debug!(external_id = %draft.external_id, "sale unchanged");
            return Ok(Reconciliation::Skipped);
        }

        store.update_sale(&sale).await?;
        if changed.iter().any(|field| *field != "currency") {
            store
                .replace_sale_months(&sale.uuid, &sale.monthly_breakdown())
                .await?;
        }
        debug!(external_id = %draft.external_id, fields = ?changed, "sale updated");
        Ok(Reconciliation::Updated(changed))
    }
}
