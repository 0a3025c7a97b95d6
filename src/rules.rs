use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{JurnalError, Result};
use crate::models::{
    Account, KoreksiRule, ObyekRule, TaxCategory, TaxFlag, TaxKeyword, WithholdingTaxRule,
};

/// Where the rule cache reads from. Each list comes back in the order the engine must scan it.
pub trait RuleSource {
    fn active_accounts(&self) -> Result<Vec<Account>>;
    fn active_koreksi_rules(&self) -> Result<Vec<KoreksiRule>>;
    fn active_obyek_rules(&self) -> Result<Vec<ObyekRule>>;
    fn active_withholding_tax_rules(&self) -> Result<Vec<WithholdingTaxRule>>;
    fn active_tax_keywords(&self) -> Result<Vec<TaxKeyword>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRef {
    pub name: String,
    pub nature: String,
    pub tag: Option<TaxFlag>,
    pub analysis_note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelRule {
    pub keyword: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithholdingRule {
    pub keyword: String,
    pub flag: TaxFlag,
    pub rate: f64,
}

/// Snapshot of accounts and rules for one processing run.
///
/// Keywords are lowercased and tags parsed here, once, so the classifier and propagator
/// only ever compare prepared values.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    accounts: HashMap<String, AccountRef>,
    koreksi: Vec<LabelRule>,
    obyek: Vec<LabelRule>,
    withholding: Vec<WithholdingRule>,
    input_keywords: Vec<String>,
    output_keywords: Vec<String>,
}

fn wrap(list: &'static str) -> impl FnOnce(JurnalError) -> JurnalError {
    move |e| JurnalError::RuleLoad {
        list,
        source: Box::new(e),
    }
}

fn prepare_keyword(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_lowercase())
    }
}

impl RuleSet {
    pub fn load<S: RuleSource + ?Sized>(source: &S) -> Result<Self> {
        let accounts = source.active_accounts().map_err(wrap("accounts"))?;
        let koreksi = source.active_koreksi_rules().map_err(wrap("koreksi rules"))?;
        let obyek = source.active_obyek_rules().map_err(wrap("obyek rules"))?;
        let withholding = source
            .active_withholding_tax_rules()
            .map_err(wrap("withholding tax rules"))?;
        let keywords = source.active_tax_keywords().map_err(wrap("tax keywords"))?;

        let rules = Self::from_parts(accounts, koreksi, obyek, withholding, keywords);
        debug!(
            accounts = rules.accounts.len(),
            koreksi = rules.koreksi.len(),
            obyek = rules.obyek.len(),
            withholding = rules.withholding.len(),
            "rules loaded"
        );
        Ok(rules)
    }

    pub fn from_parts(
        accounts: Vec<Account>,
        koreksi: Vec<KoreksiRule>,
        obyek: Vec<ObyekRule>,
        withholding: Vec<WithholdingTaxRule>,
        keywords: Vec<TaxKeyword>,
    ) -> Self {
        let mut set = RuleSet::default();

        for acc in accounts {
            let tag = if acc.correction_tag.trim().is_empty() {
                None
            } else {
                let parsed = TaxFlag::from_tag(&acc.correction_tag);
                if parsed.is_none() {
                    warn!(account = %acc.code, tag = %acc.correction_tag, "unrecognised correction tag");
                }
                parsed
            };
            set.accounts.insert(
                acc.code,
                AccountRef {
                    name: acc.name,
                    nature: acc.nature,
                    tag,
                    analysis_note: acc.analysis_note,
                },
            );
        }

        set.koreksi = koreksi
            .into_iter()
            .filter_map(|r| {
                prepare_keyword(&r.keyword).map(|keyword| LabelRule { keyword, value: r.value })
            })
            .collect();
        set.obyek = obyek
            .into_iter()
            .filter_map(|r| {
                prepare_keyword(&r.keyword).map(|keyword| LabelRule { keyword, value: r.value })
            })
            .collect();

        for rule in withholding {
            let Some(keyword) = prepare_keyword(&rule.keyword) else {
                continue;
            };
            match TaxFlag::from_tax_type(&rule.tax_type) {
                Some(flag) => set.withholding.push(WithholdingRule {
                    keyword,
                    flag,
                    rate: rule.rate,
                }),
                None => warn!(rule = rule.id, tax_type = %rule.tax_type, "skipping withholding rule"),
            }
        }

        for kw in keywords {
            let Some(keyword) = prepare_keyword(&kw.keyword) else {
                continue;
            };
            match kw.category.parse::<TaxCategory>() {
                Ok(TaxCategory::Input) => set.input_keywords.push(keyword),
                Ok(TaxCategory::Output) => set.output_keywords.push(keyword),
                Err(_) => warn!(keyword = kw.id, category = %kw.category, "skipping tax keyword"),
            }
        }

        set
    }

    pub fn account(&self, code: &str) -> Option<&AccountRef> {
        self.accounts.get(code)
    }

    pub fn account_tag(&self, code: &str) -> Option<TaxFlag> {
        self.accounts.get(code).and_then(|a| a.tag)
    }

    pub fn koreksi_rules(&self) -> &[LabelRule] {
        &self.koreksi
    }

    pub fn obyek_rules(&self) -> &[LabelRule] {
        &self.obyek
    }

    pub fn withholding_rules(&self) -> &[WithholdingRule] {
        &self.withholding
    }

    pub fn input_keywords(&self) -> &[String] {
        &self.input_keywords
    }

    pub fn output_keywords(&self) -> &[String] {
        &self.output_keywords
    }
}
