// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hosted REST backend (PostgREST dialect). Table and column names are the
//! backend's own; the row structs below translate them to crate models.

use super::Ledger;
use crate::auth::Session;
use crate::calendar::DateRange;
use crate::config::BackendConfig;
use crate::error::LedgerError;
use crate::models::{
    CardTransaction, DueInstallment, Income, NewExpense, NewFixedExpense, NewIncome,
    NewInstallment, ParentRef, ParentUpdate, PaymentMethod,
};
use crate::utils::{check_response, http_client};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const INCOME_TABLE: &str = "renda";
const EXPENSE_TABLE: &str = "despesas";
const FIXED_TABLE: &str = "despesas_fixas";
const INSTALLMENT_TABLE: &str = "parcelas";
const CARD_PROCEDURE: &str = "get_transactions_by_card";

/// Embedded-resource select used wherever a card transaction is read.
pub const CARD_TRANSACTION_SELECT: &str =
    "*,despesas(*,parcelas(count)),despesas_fixas(*,parcelas(count))";

pub struct RemoteLedger {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct IncomeRow {
    id: i64,
    descricao: String,
    #[serde(with = "rust_decimal::serde::float")]
    valor: Decimal,
    data: NaiveDate,
}

impl From<IncomeRow> for Income {
    fn from(r: IncomeRow) -> Self {
        Income {
            id: r.id,
            description: r.descricao,
            amount: r.valor,
            date: r.data,
        }
    }
}

#[derive(Debug, Serialize)]
struct IncomeInsert<'a> {
    descricao: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    valor: Decimal,
    data: NaiveDate,
}

#[derive(Debug, Serialize)]
struct ExpenseInsert<'a> {
    descricao: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    valor_total: Decimal,
    data_compra: NaiveDate,
    categoria: Option<&'a str>,
    metodo_pagamento: PaymentMethod,
}

#[derive(Debug, Serialize)]
struct FixedExpenseInsert<'a> {
    descricao: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    valor_mensal: Decimal,
    categoria: Option<&'a str>,
    metodo_pagamento: PaymentMethod,
    dia_vencimento: u32,
    recorrente: bool,
}

#[derive(Debug, Serialize)]
struct InstallmentInsert {
    despesa_id: Option<i64>,
    despesa_fixa_id: Option<i64>,
    numero_parcela: u32,
    #[serde(with = "rust_decimal::serde::float")]
    valor_parcela: Decimal,
    data_vencimento: NaiveDate,
    pago: bool,
}

impl InstallmentInsert {
    fn new(parent: ParentRef, n: &NewInstallment) -> Self {
        InstallmentInsert {
            despesa_id: parent.expense_id(),
            despesa_fixa_id: parent.fixed_expense_id(),
            numero_parcela: n.sequence,
            valor_parcela: n.amount,
            data_vencimento: n.due_date,
            pago: n.paid,
        }
    }
}

#[derive(Debug, Serialize)]
struct InstallmentPatch {
    #[serde(with = "rust_decimal::serde::float")]
    valor_parcela: Decimal,
    data_vencimento: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct MethodOnly {
    metodo_pagamento: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DueRow {
    #[serde(with = "rust_decimal::serde::float")]
    valor_parcela: Decimal,
    #[serde(default)]
    despesas: Option<MethodOnly>,
    #[serde(default)]
    despesas_fixas: Option<MethodOnly>,
}

impl From<DueRow> for DueInstallment {
    fn from(r: DueRow) -> Self {
        let method = r
            .despesas
            .and_then(|p| p.metodo_pagamento)
            .or_else(|| r.despesas_fixas.and_then(|p| p.metodo_pagamento))
            .and_then(|m| m.parse().ok());
        DueInstallment {
            amount: r.valor_parcela,
            method,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParentEmbed {
    id: i64,
    descricao: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    valor_total: Option<Decimal>,
    #[serde(default)]
    data_compra: Option<NaiveDate>,
    #[serde(default)]
    categoria: Option<String>,
    metodo_pagamento: String,
    #[serde(default)]
    recorrente: Option<bool>,
    #[serde(default)]
    parcelas: Vec<CountRow>,
}

/// A `parcelas` row with its parent embedded, as returned both by the
/// card procedure and by a select with `CARD_TRANSACTION_SELECT`.
#[derive(Debug, Deserialize)]
pub struct CardTransactionRow {
    id: i64,
    numero_parcela: u32,
    #[serde(with = "rust_decimal::serde::float")]
    valor_parcela: Decimal,
    data_vencimento: NaiveDate,
    #[serde(default)]
    pago: bool,
    #[serde(default)]
    despesas: Option<ParentEmbed>,
    #[serde(default)]
    despesas_fixas: Option<ParentEmbed>,
}

impl TryFrom<CardTransactionRow> for CardTransaction {
    type Error = anyhow::Error;

    fn try_from(r: CardTransactionRow) -> Result<Self> {
        let (parent_ref, parent) = match (r.despesas, r.despesas_fixas) {
            (Some(p), _) => (ParentRef::Expense(p.id), p),
            (None, Some(p)) => (ParentRef::Fixed(p.id), p),
            (None, None) => {
                return Err(LedgerError::invalid(format!(
                    "Installment {} has no parent expense",
                    r.id
                ))
                .into());
            }
        };
        let installment_count = parent.parcelas.first().map(|c| c.count).unwrap_or(1);
        Ok(CardTransaction {
            id: r.id,
            parent: parent_ref,
            description: parent.descricao,
            category: parent.categoria.filter(|c| !c.is_empty()),
            method: parent.metodo_pagamento.parse()?,
            purchase_date: parent.data_compra,
            total: parent.valor_total,
            recurring: parent.recorrente.unwrap_or(false),
            sequence: r.numero_parcela,
            amount: r.valor_parcela,
            due_date: r.data_vencimento,
            paid: r.pago,
            installment_count,
        })
    }
}

/// PostgREST query pairs bounding `column` to the inclusive range.
pub fn range_filter(column: &str, range: DateRange) -> Vec<(String, String)> {
    vec![
        (column.to_string(), format!("gte.{}", range.start)),
        (column.to_string(), format!("lte.{}", range.end)),
    ]
}

pub fn id_filter(id: i64) -> (String, String) {
    ("id".to_string(), format!("eq.{}", id))
}

impl RemoteLedger {
    pub fn new(backend: &BackendConfig, session: &Session) -> Result<Self> {
        Ok(RemoteLedger {
            http: http_client(backend.timeout_secs)?,
            base_url: backend.url()?.to_string(),
            anon_key: backend.anon_key()?.to_string(),
            access_token: session.access_token.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!(%method, url, "backend request");
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.access_token)
    }

    fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = check_response(req.send().context("Backend request failed")?)?;
        resp.json::<T>().context("Unexpected backend response")
    }

    fn execute(&self, req: RequestBuilder) -> Result<()> {
        check_response(req.send().context("Backend request failed")?)?;
        Ok(())
    }

    fn insert_returning_id<B: Serialize>(&self, table: &str, body: &B) -> Result<i64> {
        let req = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&[("select", "id")])
            .json(body);
        let rows: Vec<IdRow> = self.fetch(req)?;
        rows.first()
            .map(|r| r.id)
            .with_context(|| format!("Insert into {} returned no row", table))
    }

    /// Bulk-inserts the schedule; when that fails the freshly created parent
    /// is deleted again so no installment-less expense is left behind.
    fn insert_schedule(&self, parent: ParentRef, schedule: &[NewInstallment]) -> Result<()> {
        let body: Vec<InstallmentInsert> = schedule
            .iter()
            .map(|n| InstallmentInsert::new(parent, n))
            .collect();
        let req = self
            .request(Method::POST, &self.table_url(INSTALLMENT_TABLE))
            .json(&body);
        if let Err(err) = self.execute(req) {
            if let Err(cleanup) = self.delete_parent(parent) {
                tracing::warn!(?parent, error = %cleanup, "could not remove expense after failed installment insert");
            }
            return Err(err);
        }
        Ok(())
    }

    fn update_parent(&self, parent: ParentRef, update: &ParentUpdate) -> Result<()> {
        let (table, id, body) = match parent {
            ParentRef::Expense(id) => {
                let mut body = json!({
                    "descricao": update.description,
                    "categoria": update.category,
                });
                if let Some(date) = update.purchase_date {
                    body["data_compra"] = json!(date);
                }
                (EXPENSE_TABLE, id, body)
            }
            ParentRef::Fixed(id) => (
                FIXED_TABLE,
                id,
                json!({
                    "descricao": update.description,
                    "categoria": update.category,
                }),
            ),
        };
        let req = self
            .request(Method::PATCH, &self.table_url(table))
            .query(&[id_filter(id)])
            .json(&body);
        self.execute(req)
    }
}

impl Ledger for RemoteLedger {
    fn add_income(&self, income: &NewIncome) -> Result<Income> {
        let req = self
            .request(Method::POST, &self.table_url(INCOME_TABLE))
            .header("Prefer", "return=representation")
            .json(&IncomeInsert {
                descricao: &income.description,
                valor: income.amount,
                data: income.date,
            });
        let mut rows: Vec<IncomeRow> = self.fetch(req)?;
        let row = rows.pop().context("Income insert returned no row")?;
        tracing::info!(id = row.id, "income recorded");
        Ok(row.into())
    }

    fn incomes(&self, range: DateRange) -> Result<Vec<Income>> {
        let mut query = range_filter("data", range);
        query.push(("select".into(), "*".into()));
        query.push(("order".into(), "data.desc".into()));
        let req = self
            .request(Method::GET, &self.table_url(INCOME_TABLE))
            .query(&query);
        let rows: Vec<IncomeRow> = self.fetch(req)?;
        Ok(rows.into_iter().map(Income::from).collect())
    }

    fn delete_income(&self, id: i64) -> Result<()> {
        let req = self
            .request(Method::DELETE, &self.table_url(INCOME_TABLE))
            .query(&[id_filter(id)]);
        self.execute(req)
    }

    fn add_expense(&self, expense: &NewExpense, schedule: &[NewInstallment]) -> Result<i64> {
        let id = self.insert_returning_id(
            EXPENSE_TABLE,
            &ExpenseInsert {
                descricao: &expense.description,
                valor_total: expense.total,
                data_compra: expense.purchase_date,
                categoria: expense.category.as_deref(),
                metodo_pagamento: expense.method,
            },
        )?;
        self.insert_schedule(ParentRef::Expense(id), schedule)?;
        tracing::info!(id, method = %expense.method, "expense recorded");
        Ok(id)
    }

    fn add_fixed_expense(
        &self,
        expense: &NewFixedExpense,
        schedule: &[NewInstallment],
    ) -> Result<i64> {
        let id = self.insert_returning_id(
            FIXED_TABLE,
            &FixedExpenseInsert {
                descricao: &expense.description,
                valor_mensal: expense.monthly_amount,
                categoria: expense.category.as_deref(),
                metodo_pagamento: expense.method,
                dia_vencimento: expense.due_day,
                recorrente: expense.recurring,
            },
        )?;
        self.insert_schedule(ParentRef::Fixed(id), schedule)?;
        tracing::info!(id, method = %expense.method, "fixed expense recorded");
        Ok(id)
    }

    fn due_installments(&self, range: DateRange) -> Result<Vec<DueInstallment>> {
        let mut query = range_filter("data_vencimento", range);
        query.push((
            "select".into(),
            "valor_parcela,despesas(metodo_pagamento),despesas_fixas(metodo_pagamento)".into(),
        ));
        let req = self
            .request(Method::GET, &self.table_url(INSTALLMENT_TABLE))
            .query(&query);
        let rows: Vec<DueRow> = self.fetch(req)?;
        Ok(rows.into_iter().map(DueInstallment::from).collect())
    }

    fn card_transactions(
        &self,
        method: PaymentMethod,
        range: DateRange,
    ) -> Result<Vec<CardTransaction>> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, CARD_PROCEDURE);
        let req = self.request(Method::POST, &url).json(&json!({
            "card_name": method,
            "start_date": range.start,
            "end_date": range.end,
        }));
        let rows: Vec<CardTransactionRow> = self.fetch(req)?;
        rows.into_iter().map(CardTransaction::try_from).collect()
    }

    fn card_transaction(&self, installment_id: i64) -> Result<Option<CardTransaction>> {
        let req = self
            .request(Method::GET, &self.table_url(INSTALLMENT_TABLE))
            .query(&[
                ("select".to_string(), CARD_TRANSACTION_SELECT.to_string()),
                id_filter(installment_id),
            ]);
        let rows: Vec<CardTransactionRow> = self.fetch(req)?;
        rows.into_iter()
            .next()
            .map(CardTransaction::try_from)
            .transpose()
    }

    fn update_transaction(
        &self,
        installment_id: i64,
        parent: ParentRef,
        update: &ParentUpdate,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<()> {
        // no multi-table transactions over REST; the installment goes first so
        // a failure leaves the parent untouched
        let req = self
            .request(Method::PATCH, &self.table_url(INSTALLMENT_TABLE))
            .query(&[id_filter(installment_id)])
            .json(&InstallmentPatch {
                valor_parcela: amount,
                data_vencimento: due_date,
            });
        self.execute(req)?;
        self.update_parent(parent, update)
    }

    fn delete_parent(&self, parent: ParentRef) -> Result<()> {
        let (table, id) = match parent {
            ParentRef::Expense(id) => (EXPENSE_TABLE, id),
            ParentRef::Fixed(id) => (FIXED_TABLE, id),
        };
        let req = self
            .request(Method::DELETE, &self.table_url(table))
            .query(&[id_filter(id)]);
        self.execute(req)
    }

    fn delete_installment(&self, id: i64) -> Result<()> {
        let req = self
            .request(Method::DELETE, &self.table_url(INSTALLMENT_TABLE))
            .query(&[id_filter(id)]);
        self.execute(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn installment_bodies_send_amounts_as_numbers() {
        let patch = InstallmentPatch {
            valor_parcela: Decimal::new(25050, 2),
            data_vencimento: d("2025-04-10"),
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "valor_parcela": 250.5, "data_vencimento": "2025-04-10" })
        );

        let row = NewInstallment {
            sequence: 2,
            amount: Decimal::new(8990, 2),
            due_date: d("2025-05-05"),
            paid: false,
        };
        assert_eq!(
            serde_json::to_value(InstallmentInsert::new(ParentRef::Fixed(3), &row)).unwrap(),
            json!({
                "despesa_id": null,
                "despesa_fixa_id": 3,
                "numero_parcela": 2,
                "valor_parcela": 89.9,
                "data_vencimento": "2025-05-05",
                "pago": false
            })
        );
    }
}
