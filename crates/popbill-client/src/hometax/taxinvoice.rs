//! Hometax tax-invoice collection (scope `111`).
//!
//! Same job protocol as cashbill collection, plus per-document detail
//! lookup by the 24-character NTS confirmation number and member-page URL
//! fetches for viewing/printing a document on hometax.

use popbill_core::{JobId, NtsConfirmNum, PartnerIdentity, Ymd};
use reqwest::Method;
use serde::Deserialize;

use crate::charge::{ChargeInfo, FlatRateState, UrlResponse};
use crate::error::PopbillError;
use crate::hometax::{self, HometaxResponse};
use crate::job::{JobLifecycle, JobState, SearchResult, SortOrder};
use crate::query::QueryBuilder;
use crate::transport::{Payload, Transport};

const BASE_PATH: &str = "HomeTax/Taxinvoice";

pub(crate) const SCOPES: &[&str] = &["111"];

/// Which role's tax invoices to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxinvoiceQueryType {
    /// Invoices the corporation issued.
    Sell,
    /// Invoices issued to the corporation.
    Buy,
    /// Invoices the corporation issued as a trustee.
    Trustee,
}

impl TaxinvoiceQueryType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Sell => "SELL",
            Self::Buy => "BUY",
            Self::Trustee => "TRUSTEE",
        }
    }
}

/// Which document date the requested range applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxinvoiceDateType {
    /// Document write date.
    Write,
    /// NTS issue date.
    Issue,
    /// NTS transmission date.
    Send,
}

impl TaxinvoiceDateType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Write => "W",
            Self::Issue => "I",
            Self::Send => "S",
        }
    }
}

/// Original vs. amended document filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxinvoiceDocType {
    Normal,
    Modified,
}

impl TaxinvoiceDocType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "N",
            Self::Modified => "M",
        }
    }
}

/// Taxation kind filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxinvoiceTaxType {
    Taxable,
    TaxFree,
    ZeroRated,
}

impl TaxinvoiceTaxType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Taxable => "T",
            Self::TaxFree => "N",
            Self::ZeroRated => "Z",
        }
    }
}

/// Receipt/charge purpose filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxinvoicePurposeType {
    Receipt,
    Charge,
    None,
}

impl TaxinvoicePurposeType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "R",
            Self::Charge => "C",
            Self::None => "N",
        }
    }
}

/// Filters for search and summary. Empty lists place no constraint and emit
/// no query parameter. The `tax_reg_id*` trio carries the service's opaque
/// branch-registration codes unmodified.
#[derive(Debug, Clone, Default)]
pub struct TaxinvoiceSearchOptions {
    pub doc_types: Vec<TaxinvoiceDocType>,
    pub tax_types: Vec<TaxinvoiceTaxType>,
    pub purpose_types: Vec<TaxinvoicePurposeType>,
    pub tax_reg_id_yn: Option<String>,
    pub tax_reg_id_type: Option<String>,
    pub tax_reg_ids: Vec<String>,
    /// Free-text match on trading-partner fields; percent-encoded on the
    /// wire.
    pub search_string: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub order: Option<SortOrder>,
}

impl TaxinvoiceSearchOptions {
    fn filter_query(&self) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .push_list("Type", &codes(&self.doc_types, |t| t.as_str()))
            .push_list("TaxType", &codes(&self.tax_types, |t| t.as_str()))
            .push_list("PurposeType", &codes(&self.purpose_types, |p| p.as_str()))
            .push_opt("TaxRegIDYN", self.tax_reg_id_yn.as_deref())
            .push_opt("TaxRegIDType", self.tax_reg_id_type.as_deref())
            .push_list("TaxRegID", &self.tax_reg_ids)
            .push_opt("SearchString", self.search_string.as_deref());
        query
    }
}

/// Abbreviated tax-invoice record returned by search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxinvoiceAbbr {
    #[serde(rename = "ntsconfirmNum")]
    pub nts_confirm_num: NtsConfirmNum,
    #[serde(default)]
    pub write_date: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub send_date: Option<String>,
    #[serde(default)]
    pub tax_type: Option<String>,
    #[serde(default)]
    pub purpose_type: Option<String>,
    #[serde(default)]
    pub supply_cost_total: Option<String>,
    #[serde(default)]
    pub tax_total: Option<String>,
    #[serde(default)]
    pub total_amount: Option<String>,
    #[serde(default)]
    pub remark1: Option<String>,
    /// Whether this is an amendment of an earlier document.
    #[serde(rename = "modifyYN", default)]
    pub modify_yn: Option<bool>,
    #[serde(rename = "orgNTSConfirmNum", default)]
    pub org_nts_confirm_num: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub spec: Option<String>,
    #[serde(default)]
    pub qty: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<String>,
    #[serde(default)]
    pub supply_cost: Option<String>,
    #[serde(default)]
    pub tax: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub invoicer_corp_num: Option<String>,
    #[serde(rename = "invoicerTaxRegID", default)]
    pub invoicer_tax_reg_id: Option<String>,
    #[serde(default)]
    pub invoicer_corp_name: Option<String>,
    #[serde(rename = "invoicerCEOName", default)]
    pub invoicer_ceo_name: Option<String>,
    #[serde(default)]
    pub invoicer_email: Option<String>,
    #[serde(default)]
    pub invoicee_corp_num: Option<String>,
    #[serde(default)]
    pub invoicee_type: Option<String>,
    #[serde(rename = "invoiceeTaxRegID", default)]
    pub invoicee_tax_reg_id: Option<String>,
    #[serde(default)]
    pub invoicee_corp_name: Option<String>,
    #[serde(rename = "invoiceeCEOName", default)]
    pub invoicee_ceo_name: Option<String>,
    #[serde(default)]
    pub invoicee_email1: Option<String>,
    #[serde(default)]
    pub invoicee_email2: Option<String>,
    #[serde(default)]
    pub trustee_corp_num: Option<String>,
    #[serde(rename = "trusteeTaxRegID", default)]
    pub trustee_tax_reg_id: Option<String>,
    #[serde(default)]
    pub trustee_corp_name: Option<String>,
    #[serde(rename = "trusteeCEOName", default)]
    pub trustee_ceo_name: Option<String>,
    #[serde(default)]
    pub trustee_email: Option<String>,
    /// `1` for sales documents, `2` for purchases, `3` for trustee issues.
    #[serde(default)]
    pub invoice_type: Option<i32>,
}

/// Full tax-invoice document returned by per-document lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxinvoice {
    #[serde(default)]
    pub write_date: Option<String>,
    #[serde(rename = "issueDT", default)]
    pub issue_dt: Option<String>,
    #[serde(default)]
    pub invoice_type: Option<i32>,
    #[serde(default)]
    pub tax_type: Option<String>,
    #[serde(default)]
    pub tax_total: Option<String>,
    #[serde(default)]
    pub supply_cost_total: Option<String>,
    #[serde(default)]
    pub total_amount: Option<String>,
    #[serde(default)]
    pub purpose_type: Option<String>,
    #[serde(default)]
    pub serial_num: Option<String>,
    #[serde(default)]
    pub cash: Option<String>,
    #[serde(default)]
    pub chk_bill: Option<String>,
    #[serde(default)]
    pub credit: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub remark1: Option<String>,
    #[serde(default)]
    pub remark2: Option<String>,
    #[serde(default)]
    pub remark3: Option<String>,
    #[serde(rename = "ntsconfirmNum")]
    pub nts_confirm_num: NtsConfirmNum,
    /// Amendment code when this document modifies an earlier one.
    #[serde(default)]
    pub modify_code: Option<i32>,
    #[serde(rename = "orgNTSConfirmNum", default)]
    pub org_nts_confirm_num: Option<String>,
    #[serde(default)]
    pub invoicer_corp_num: Option<String>,
    #[serde(rename = "invoicerMgtKey", default)]
    pub invoicer_mgt_key: Option<String>,
    #[serde(rename = "invoicerTaxRegID", default)]
    pub invoicer_tax_reg_id: Option<String>,
    #[serde(default)]
    pub invoicer_corp_name: Option<String>,
    #[serde(rename = "invoicerCEOName", default)]
    pub invoicer_ceo_name: Option<String>,
    #[serde(default)]
    pub invoicer_addr: Option<String>,
    #[serde(default)]
    pub invoicer_biz_type: Option<String>,
    #[serde(default)]
    pub invoicer_biz_class: Option<String>,
    #[serde(default)]
    pub invoicer_contact_name: Option<String>,
    #[serde(default)]
    pub invoicer_dept_name: Option<String>,
    #[serde(rename = "invoicerTEL", default)]
    pub invoicer_tel: Option<String>,
    #[serde(default)]
    pub invoicer_email: Option<String>,
    #[serde(default)]
    pub invoicee_corp_num: Option<String>,
    #[serde(default)]
    pub invoicee_type: Option<String>,
    #[serde(rename = "invoiceeMgtKey", default)]
    pub invoicee_mgt_key: Option<String>,
    #[serde(rename = "invoiceeTaxRegID", default)]
    pub invoicee_tax_reg_id: Option<String>,
    #[serde(default)]
    pub invoicee_corp_name: Option<String>,
    #[serde(rename = "invoiceeCEOName", default)]
    pub invoicee_ceo_name: Option<String>,
    #[serde(default)]
    pub invoicee_addr: Option<String>,
    #[serde(default)]
    pub invoicee_biz_type: Option<String>,
    #[serde(default)]
    pub invoicee_biz_class: Option<String>,
    #[serde(default)]
    pub invoicee_contact_name1: Option<String>,
    #[serde(default)]
    pub invoicee_dept_name1: Option<String>,
    #[serde(rename = "invoiceeTEL1", default)]
    pub invoicee_tel1: Option<String>,
    #[serde(default)]
    pub invoicee_email1: Option<String>,
    #[serde(default)]
    pub invoicee_contact_name2: Option<String>,
    #[serde(default)]
    pub invoicee_dept_name2: Option<String>,
    #[serde(rename = "invoiceeTEL2", default)]
    pub invoicee_tel2: Option<String>,
    #[serde(default)]
    pub invoicee_email2: Option<String>,
    #[serde(default)]
    pub trustee_corp_num: Option<String>,
    #[serde(rename = "trusteeMgtKey", default)]
    pub trustee_mgt_key: Option<String>,
    #[serde(rename = "trusteeTaxRegID", default)]
    pub trustee_tax_reg_id: Option<String>,
    #[serde(default)]
    pub trustee_corp_name: Option<String>,
    #[serde(rename = "trusteeCEOName", default)]
    pub trustee_ceo_name: Option<String>,
    #[serde(default)]
    pub trustee_addr: Option<String>,
    #[serde(default)]
    pub trustee_biz_type: Option<String>,
    #[serde(default)]
    pub trustee_biz_class: Option<String>,
    #[serde(default)]
    pub trustee_contact_name: Option<String>,
    #[serde(default)]
    pub trustee_dept_name: Option<String>,
    #[serde(rename = "trusteeTEL", default)]
    pub trustee_tel: Option<String>,
    #[serde(default)]
    pub trustee_email: Option<String>,
    #[serde(default)]
    pub detail_list: Vec<TaxinvoiceDetail>,
}

/// One line item of a tax invoice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxinvoiceDetail {
    #[serde(default)]
    pub serial_num: Option<i32>,
    #[serde(rename = "purchaseDT", default)]
    pub purchase_dt: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub spec: Option<String>,
    #[serde(default)]
    pub qty: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<String>,
    #[serde(default)]
    pub supply_cost: Option<String>,
    #[serde(default)]
    pub tax: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// NTS XML record of one collected document, wrapped in the service's
/// result envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxinvoiceXml {
    #[serde(rename = "ResultCode", default)]
    pub result_code: Option<i64>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    /// Raw XML document as received from the NTS.
    #[serde(rename = "retObject", default)]
    pub ret_object: Option<String>,
}

/// Aggregate totals over a finished job's collected tax invoices.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxinvoiceSummary {
    pub count: i64,
    pub supply_cost_total: i64,
    pub tax_total: i64,
    pub amount_total: i64,
}

/// Sub-client for hometax tax-invoice collection.
pub struct HometaxTaxinvoiceClient {
    jobs: JobLifecycle,
}

impl HometaxTaxinvoiceClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self {
            jobs: JobLifecycle::new(transport, BASE_PATH),
        }
    }

    /// Queue a collection job for the date range (inclusive, `YYYYMMDD`),
    /// matched against the chosen document date.
    ///
    /// Not idempotent: every call queues a new job and is never retried.
    pub async fn request_job(
        &self,
        identity: &PartnerIdentity,
        query_type: TaxinvoiceQueryType,
        date_type: TaxinvoiceDateType,
        start_date: &str,
        end_date: &str,
    ) -> Result<JobId, PopbillError> {
        let start = date_field("SDate", start_date)?;
        let end = date_field("EDate", end_date)?;

        let mut query = QueryBuilder::new();
        query
            .push("DType", date_type.as_str())
            .push("SDate", start.as_str())
            .push("EDate", end.as_str());
        let path = query.apply(&format!("{}/{}", BASE_PATH, query_type.as_str()));
        self.jobs.request_job(identity, &path).await
    }

    /// Current state of one collection job. Single-shot; callers poll.
    pub async fn job_state(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
    ) -> Result<JobState, PopbillError> {
        self.jobs.job_state(identity, job_id).await
    }

    /// States of the identity's recent collection jobs.
    pub async fn list_active_jobs(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<Vec<JobState>, PopbillError> {
        self.jobs.list_jobs(identity).await
    }

    /// Page through a job's collected tax invoices.
    pub async fn search(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
        options: &TaxinvoiceSearchOptions,
    ) -> Result<SearchResult<TaxinvoiceAbbr>, PopbillError> {
        let mut query = options.filter_query();
        query
            .push_opt("Page", options.page.map(|p| p.to_string()).as_deref())
            .push_opt("PerPage", options.per_page.map(|p| p.to_string()).as_deref())
            .push_opt("Order", options.order.map(SortOrder::as_str));
        let path = query.apply(&format!("{}/{}", BASE_PATH, job_id));
        self.jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// Aggregate totals over a job's collected tax invoices. Paging and
    /// ordering fields of `options` are ignored.
    pub async fn summary(
        &self,
        identity: &PartnerIdentity,
        job_id: &JobId,
        options: &TaxinvoiceSearchOptions,
    ) -> Result<TaxinvoiceSummary, PopbillError> {
        let query = options.filter_query();
        let path = query.apply(&format!("{}/{}/Summary", BASE_PATH, job_id));
        self.jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// Fetch one collected document in full by its NTS confirmation number.
    pub async fn get_taxinvoice(
        &self,
        identity: &PartnerIdentity,
        confirm_num: &NtsConfirmNum,
    ) -> Result<Taxinvoice, PopbillError> {
        let path = format!("{}/{}", BASE_PATH, confirm_num);
        self.jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// Fetch one collected document as its raw NTS XML record.
    pub async fn get_taxinvoice_xml(
        &self,
        identity: &PartnerIdentity,
        confirm_num: &NtsConfirmNum,
    ) -> Result<TaxinvoiceXml, PopbillError> {
        let mut query = QueryBuilder::new();
        query.push("T", "xml");
        let path = query.apply(&format!("{}/{}", BASE_PATH, confirm_num));
        self.jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await
    }

    /// Member-page URL that renders the document on hometax.
    pub async fn popup_url(
        &self,
        identity: &PartnerIdentity,
        confirm_num: &NtsConfirmNum,
    ) -> Result<String, PopbillError> {
        self.document_url(identity, confirm_num, "PopUp").await
    }

    /// Member-page URL with the document laid out for printing.
    pub async fn print_url(
        &self,
        identity: &PartnerIdentity,
        confirm_num: &NtsConfirmNum,
    ) -> Result<String, PopbillError> {
        self.document_url(identity, confirm_num, "Print").await
    }

    async fn document_url(
        &self,
        identity: &PartnerIdentity,
        confirm_num: &NtsConfirmNum,
        page: &str,
    ) -> Result<String, PopbillError> {
        let path = format!("{}/{}/{}", BASE_PATH, confirm_num, page);
        let resp: UrlResponse = self
            .jobs
            .transport()
            .request_json(Method::GET, &path, identity, Payload::None)
            .await?;
        Ok(resp.url)
    }

    pub async fn charge_info(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<ChargeInfo, PopbillError> {
        hometax::charge_info(&self.jobs, identity).await
    }

    pub async fn flat_rate_state(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<FlatRateState, PopbillError> {
        hometax::flat_rate_state(&self.jobs, identity).await
    }

    pub async fn flat_rate_popup_url(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<String, PopbillError> {
        hometax::flat_rate_popup_url(&self.jobs, identity).await
    }

    pub async fn certificate_popup_url(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<String, PopbillError> {
        hometax::certificate_popup_url(&self.jobs, identity).await
    }

    pub async fn certificate_expiration(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<String, PopbillError> {
        hometax::certificate_expiration(&self.jobs, identity).await
    }

    pub async fn check_cert_validation(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::check_cert_validation(&self.jobs, identity).await
    }

    pub async fn register_dept_user(
        &self,
        identity: &PartnerIdentity,
        dept_user_id: &str,
        dept_user_pwd: &str,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::register_dept_user(&self.jobs, identity, dept_user_id, dept_user_pwd).await
    }

    pub async fn check_dept_user(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::check_dept_user(&self.jobs, identity).await
    }

    pub async fn check_login_dept_user(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::check_login_dept_user(&self.jobs, identity).await
    }

    pub async fn delete_dept_user(
        &self,
        identity: &PartnerIdentity,
    ) -> Result<HometaxResponse, PopbillError> {
        hometax::delete_dept_user(&self.jobs, identity).await
    }
}

fn date_field(field: &'static str, value: &str) -> Result<Ymd, PopbillError> {
    Ymd::new(value).map_err(|e| PopbillError::Input {
        field,
        reason: e.to_string(),
    })
}

fn codes<T: Copy>(values: &[T], f: impl Fn(T) -> &'static str) -> Vec<&'static str> {
    values.iter().map(|v| f(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes() {
        assert_eq!(TaxinvoiceQueryType::Trustee.as_str(), "TRUSTEE");
        assert_eq!(TaxinvoiceDateType::Write.as_str(), "W");
        assert_eq!(TaxinvoiceTaxType::ZeroRated.as_str(), "Z");
        assert_eq!(TaxinvoicePurposeType::Receipt.as_str(), "R");
        assert_eq!(TaxinvoiceDocType::Modified.as_str(), "M");
    }

    #[test]
    fn filter_query_omits_empty_lists() {
        let options = TaxinvoiceSearchOptions::default();
        assert_eq!(options.filter_query().apply("p"), "p");
    }

    #[test]
    fn filter_query_joins_and_encodes() {
        let options = TaxinvoiceSearchOptions {
            doc_types: vec![TaxinvoiceDocType::Normal, TaxinvoiceDocType::Modified],
            search_string: Some("상호 A".into()),
            ..Default::default()
        };
        let rendered = options.filter_query().apply("p");
        assert!(rendered.contains("Type=N,M"));
        assert!(rendered.contains("SearchString=%EC%83%81%ED%98%B8+A"));
    }

    #[test]
    fn abbr_decodes_with_sparse_fields() {
        let abbr: TaxinvoiceAbbr = serde_json::from_str(
            r#"{"ntsconfirmNum":"202501014100002030000117","modifyYN":false,"taxType":"과세"}"#,
        )
        .unwrap();
        assert_eq!(abbr.modify_yn, Some(false));
        assert!(abbr.org_nts_confirm_num.is_none());
    }

    #[test]
    fn xml_record_decodes_envelope() {
        let xml: TaxinvoiceXml = serde_json::from_str(
            r#"{"ResultCode":1,"Message":"","retObject":"<TaxInvoice/>"}"#,
        )
        .unwrap();
        assert_eq!(xml.result_code, Some(1));
        assert_eq!(xml.ret_object.as_deref(), Some("<TaxInvoice/>"));
    }

    #[test]
    fn full_document_decodes_detail_list() {
        let doc: Taxinvoice = serde_json::from_str(
            r#"{
                "ntsconfirmNum": "202501014100002030000117",
                "writeDate": "20250110",
                "supplyCostTotal": "100000",
                "detailList": [
                    {"serialNum": 1, "itemName": "용역", "supplyCost": "100000", "tax": "10000"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.detail_list.len(), 1);
        assert_eq!(doc.detail_list[0].item_name.as_deref(), Some("용역"));
        assert!(doc.trustee_corp_num.is_none());
    }
}
