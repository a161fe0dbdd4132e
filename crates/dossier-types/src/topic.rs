//! Topic tags: a fixed vocabulary used to flag risk and role categories.

use crate::{CleanContext, PropertyType};

pub static TOPIC: TopicType = TopicType;

const TOPICS: &[(&str, &str)] = &[
    ("crime", "Crime"),
    ("crime.fraud", "Fraud"),
    ("crime.cyber", "Cybercrime"),
    ("crime.fin", "Financial crime"),
    ("crime.env", "Environmental violations"),
    ("crime.theft", "Theft"),
    ("crime.war", "War crimes"),
    ("crime.boss", "Criminal leadership"),
    ("crime.terror", "Terrorism"),
    ("crime.traffick", "Trafficking"),
    ("crime.traffick.drug", "Drug trafficking"),
    ("crime.traffick.human", "Human trafficking"),
    ("corp.offshore", "Offshore"),
    ("corp.shell", "Shell company"),
    ("corp.public", "Public listed company"),
    ("corp.disqual", "Disqualified"),
    ("gov", "Government"),
    ("gov.national", "National government"),
    ("gov.state", "State government"),
    ("gov.muni", "Municipal government"),
    ("gov.soe", "State-owned enterprise"),
    ("gov.igo", "Intergovernmental organization"),
    ("gov.head", "Head of government or state"),
    ("gov.admin", "Civil service"),
    ("gov.executive", "Executive branch of government"),
    ("gov.legislative", "Legislative branch of government"),
    ("gov.judicial", "Judicial branch of government"),
    ("gov.security", "Security services"),
    ("gov.financial", "Central banking and financial integrity"),
    ("fin", "Financial services"),
    ("fin.bank", "Bank"),
    ("fin.fund", "Fund"),
    ("fin.adivsor", "Financial advisor"),
    ("role.pep", "Politician"),
    ("role.pol", "Non-PEP"),
    ("role.rca", "Close Associate"),
    ("role.judge", "Judge"),
    ("role.civil", "Civil servant"),
    ("role.diplo", "Diplomat"),
    ("role.lawyer", "Lawyer"),
    ("role.acct", "Accountant"),
    ("role.spy", "Spy"),
    ("role.oligarch", "Oligarch"),
    ("role.journo", "Journalist"),
    ("role.act", "Activist"),
    ("pol.party", "Political party"),
    ("pol.union", "Union"),
    ("rel", "Religion"),
    ("mil", "Military"),
    ("asset.frozen", "Frozen asset"),
    ("sanction", "Sanctioned entity"),
    ("sanction.linked", "Sanction-linked entity"),
    ("sanction.counter", "Counter-sanctioned entity"),
    ("export.control", "Export controlled"),
    ("debarment", "Debarred entity"),
    ("poi", "Person of interest"),
];

#[derive(Debug, Clone, Copy)]
pub struct TopicType;

impl PropertyType for TopicType {
    fn name(&self) -> &'static str {
        "topic"
    }

    fn label(&self) -> &'static str {
        "Topic"
    }

    fn plural(&self) -> &'static str {
        "Topics"
    }

    fn group(&self) -> Option<&'static str> {
        Some("topics")
    }

    fn max_length(&self) -> usize {
        64
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let key = text.trim().to_lowercase();
        TOPICS
            .iter()
            .find(|(code, _)| *code == key)
            .map(|(code, _)| (*code).to_string())
    }

    fn caption(&self, value: &str) -> String {
        TOPICS
            .iter()
            .find(|(code, _)| *code == value)
            .map(|(_, label)| (*label).to_string())
            .unwrap_or_else(|| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_topics_clean() {
        let ctx = CleanContext::default();
        assert_eq!(TOPIC.clean("Role.PEP", &ctx).as_deref(), Some("role.pep"));
        assert_eq!(TOPIC.clean("role.wizard", &ctx), None);
        assert_eq!(TOPIC.caption("sanction"), "Sanctioned entity");
    }
}
