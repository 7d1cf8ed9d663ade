//! Client row import: matched by `nip`

use async_trait::async_trait;
use phonenumber::country;
use tracing::debug;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;

/// Columns a client row must carry
pub const CLIENT_KEYS: &[&str] = &[
    "name",
    "country",
    "phone_number",
    "address_line",
    "city",
    "email",
    "nip",
    "trader",
];

/// Validated client row
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub name: String,
    pub country: String,
    pub phone_number: String,
    pub address_line: String,
    pub city: String,
    pub email: String,
    pub nip: String,
    pub trader: Uuid,
}

/// Imports client rows
#[derive(Debug, Clone)]
pub struct ClientImport {
    region: country::Id,
    nip_length: usize,
}

impl ClientImport {
    pub fn new(region: country::Id, nip_length: usize) -> Self {
        Self { region, nip_length }
    }
}

/// Copy a draft field onto the stored client when they differ, noting its name
macro_rules! sync_field {
    ($client:ident, $draft:ident, $changed:ident, $field:ident) => {
        if $client.$field != $draft.$field {
            $client.$field = $draft.$field.clone();
            $changed.push(stringify!($field));
        }
    };
}

#[async_trait]
impl<S: RecordStore> EntityImport<S> for ClientImport {
    type Draft = ClientDraft;

    fn kind(&self) -> EntityKind {
        EntityKind::Client
    }

    fn required_keys(&self) -> &'static [&'static str] {
        CLIENT_KEYS
    }

    async fn validate_row_data(
        &self,
        store: &S,
        row: &ImportRow,
    ) -> ImportResult<RowValidation<ClientDraft>> {
        let mut errors = Vec::new();

        let trader_email = row.field("trader");
        let trader = collect(
            resolve_unique(
                store.traders_by_email(trader_email).await?,
                "Trader",
                "email",
                trader_email,
            ),
            &mut errors,
        );

        let nip = row.field("nip");
        collect(validate_nip(nip, self.nip_length), &mut errors);

        let phone_number = row.field("phone_number");
        collect(validate_phone_number(phone_number, self.region), &mut errors);

        match trader {
            Some(trader) if errors.is_empty() => Ok(Ok(ClientDraft {
                name: row.field("name").to_string(),
                country: row.field("country").to_string(),
                phone_number: phone_number.to_string(),
                address_line: row.field("address_line").to_string(),
                city: row.field("city").to_string(),
                email: row.field("email").to_string(),
                nip: nip.to_string(),
                trader: trader.uuid,
            })),
            _ => Ok(Err(errors)),
        }
    }

    async fn reconcile(&self, store: &mut S, draft: ClientDraft) -> ImportResult<Reconciliation> {
        let Some(mut client) = store.find_client_by_nip(&draft.nip).await? else {
            if store.client_email_taken(&draft.email, None).await? {
                return Ok(Reconciliation::Rejected(vec![format!(
                    "Client with email {} already exists",
                    draft.email
                )]));
            }

            let client = Client {
                uuid: Uuid::new_v4(),
                name: draft.name,
                country: draft.country,
                phone_number: draft.phone_number,
                address_line: draft.address_line,
                city: draft.city,
                email: draft.email,
                nip: draft.nip,
                trader: Some(draft.trader),
                created_date: chrono::Utc::now().date_naive(),
                external_id: None,
            };
            store.save_client(&client).await?;
            debug!(nip = %client.nip, "client created");
            return Ok(Reconciliation::Created);
        };

        let mut changed = Vec::new();
        sync_field!(client, draft, changed, name);
        sync_field!(client, draft, changed, country);
        sync_field!(client, draft, changed, phone_number);
        sync_field!(client, draft, changed, address_line);
        sync_field!(client, draft, changed, city);
        sync_field!(client, draft, changed, email);

        if changed.is_empty() {
            debug!(nip = %draft.nip, "client unchanged");
            return Ok(Reconciliation::Skipped);
        }

        if changed.contains(&"email")
            && store
                .client_email_taken(&client.email, Some(client.uuid))
                .await?
        {
            return Ok(Reconciliation::Rejected(vec![format!(
                "Client with email {} already exists",
                client.email
            )]));
        }

        store.update_client(&client).await?;
        debug!(nip = %draft.nip, fields = ?changed, "client updated");
        Ok(Reconciliation::Updated(changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::fixtures::*;
    use crate::utils::MemoryStore;

    fn import() -> ClientImport {
        ClientImport::new(country::Id::PL, 10)
    }

    async fn validate(store: &MemoryStore, row: &ImportRow) -> RowValidation<ClientDraft> {
        import().validate_row_data(store, row).await.unwrap()
    }

    #[tokio::test]
    async fn test_valid_row_produces_draft() {
        let store = seeded_store().await;
        let draft = validate(&store, &client_row()).await.unwrap();

        assert_eq!(draft.nip, "1234567890");
        assert_eq!(draft.email, "office@acme.pl");
    }

    #[tokio::test]
    async fn test_short_nip_names_the_value() {
        let store = seeded_store().await;
        let errors = validate(&store, &with(client_row(), "nip", "123456789"))
            .await
            .unwrap_err();

        assert_eq!(errors, vec!["Invalid nip 123456789: expected 10 characters"]);
    }

    #[tokio::test]
    async fn test_unknown_trader_and_bad_phone_accumulate() {
        let store = seeded_store().await;
        let row = with(
            with(client_row(), "trader", "ghost@example.com"),
            "phone_number",
            "12",
        );

        let errors = validate(&store, &row).await.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("ghost@example.com"));
        assert!(errors[1].contains("phone_number"));
    }

    #[tokio::test]
    async fn test_ambiguous_trader_email_fails() {
        let mut store = seeded_store().await;
        store
            .save_trader(&Trader::new(
                TRADER_EMAIL.to_string(),
                "Anna".to_string(),
                "Kowalska".to_string(),
            ))
            .await
            .unwrap();

        let errors = validate(&store, &client_row()).await.unwrap_err();
        assert!(errors[0].contains("ambiguous"));
    }

    #[tokio::test]
    async fn test_create_links_trader_then_skips_identical_row() {
        let mut store = seeded_store().await;

        let draft = validate(&store, &client_row()).await.unwrap();
        let trader = draft.trader;
        assert_eq!(
            import().reconcile(&mut store, draft.clone()).await.unwrap(),
            Reconciliation::Created
        );

        let stored = store.find_client_by_nip("1234567890").await.unwrap().unwrap();
        assert_eq!(stored.trader, Some(trader));

        assert_eq!(
            import().reconcile(&mut store, draft).await.unwrap(),
            Reconciliation::Skipped
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_blocks_create() {
        let mut store = seeded_store().await;
        let draft = validate(&store, &with(client_row(), "email", "billing@acme.pl"))
            .await
            .unwrap();

        let result = import().reconcile(&mut store, draft).await.unwrap();
        assert!(matches!(result, Reconciliation::Rejected(_)));
        assert!(store.find_client_by_nip("1234567890").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_reports_fields_in_check_order() {
        let mut store = seeded_store().await;
        let row = with(
            with(with(client_row(), "nip", "9999999999"), "city", "Kraków"),
            "email",
            "billing@acme.pl",
        );
        let draft = validate(&store, &with(row, "country", "PL")).await.unwrap();

        assert_eq!(
            import().reconcile(&mut store, draft).await.unwrap(),
            Reconciliation::Updated(vec!["country", "city"])
        );
        let stored = store.find_client_by_nip("9999999999").await.unwrap().unwrap();
        assert_eq!(stored.city, "Kraków");
    }

    #[tokio::test]
    async fn test_update_cannot_take_another_clients_email() {
        let mut store = seeded_store().await;
        store
            .save_client(&client("Beta", "5555555555", "office@beta.pl"))
            .await
            .unwrap();

        let row = with(
            with(client_row(), "nip", "9999999999"),
            "email",
            "office@beta.pl",
        );
        let draft = validate(&store, &row).await.unwrap();

        let result = import().reconcile(&mut store, draft).await.unwrap();
        assert!(matches!(result, Reconciliation::Rejected(_)));
    }
}
