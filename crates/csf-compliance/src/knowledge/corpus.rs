//! Seed knowledge base shipped with the service: authored answers and the
//! regulatory passages cited by the standard rule tables.

use std::sync::Arc;

use tracing::info;

use super::domain::{KbEntryDraft, KbEntryId, PassageDraft};
use super::embedding::Embedder;
use super::index::{KnowledgeBase, KnowledgeError};
use crate::config::RetrievalConfig;
use crate::decisions::domain::{DecisionType, Jurisdiction};

impl KnowledgeBase {
    /// Knowledge base preloaded with [`standard_entries`] and [`standard_passages`].
    pub fn standard(
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Result<Self, KnowledgeError> {
        let knowledge = Self::new(embedder, config);
        knowledge.rebuild(standard_entries(), standard_passages())?;
        let index = knowledge.snapshot();
        info!(
            entries = index.entries().len(),
            passages = index.passages().len(),
            "standard knowledge base loaded"
        );
        Ok(knowledge)
    }
}

fn entry(
    id: &str,
    question: &str,
    answer: &str,
    decision_type: Option<DecisionType>,
    jurisdiction: Jurisdiction,
) -> KbEntryDraft {
    KbEntryDraft {
        id: Some(KbEntryId(id.to_string())),
        canonical_question: question.to_string(),
        answer: answer.to_string(),
        decision_type,
        jurisdiction,
    }
}

pub fn standard_entries() -> Vec<KbEntryDraft> {
    vec![
        entry(
            "kb-dea-renewal",
            "How do I renew my DEA license?",
            "Renew online through the DEA Diversion Control Division using Form 224a (practitioners) \
             or the form matching your business activity. DEA sends a renewal notice about 60 days \
             before expiration; renewals submitted after the expiration date are treated as new \
             applications.",
            None,
            Jurisdiction::Federal,
        ),
        entry(
            "kb-dea-new-application",
            "What is required to obtain a DEA registration?",
            "Submit DEA Form 224 with a valid state license for each location where controlled \
             substances are handled, the schedules requested, and the registration fee. A separate \
             registration is required for each principal place of business.",
            Some(DecisionType::CsfFacility),
            Jurisdiction::Federal,
        ),
        entry(
            "kb-ryan-haight",
            "Do I need a Ryan Haight attestation for telemedicine prescribing?",
            "Yes. Practitioners prescribing controlled substances through telemedicine must satisfy \
             the Ryan Haight Act, either through an in-person evaluation or a qualifying telemedicine \
             exception, and attest to it on the order.",
            Some(DecisionType::CsfPractitioner),
            Jurisdiction::Federal,
        ),
        entry(
            "kb-schedule-ii-storage",
            "What storage security is required for Schedule II drugs?",
            "Schedule II substances must be stored in a securely locked, substantially constructed \
             cabinet or safe, with access limited to authorized personnel.",
            Some(DecisionType::CsfFacility),
            Jurisdiction::Federal,
        ),
        entry(
            "kb-ship-to-address",
            "Can I ship controlled substances to an address that differs from the DEA registration?",
            "No. Controlled substances may only be shipped to the address printed on the \
             purchaser's DEA registration.",
            None,
            Jurisdiction::Federal,
        ),
        entry(
            "kb-ohio-tddd-category",
            "Which TDDD category is needed to handle controlled substances in Ohio?",
            "A Category III terminal distributor license is required to possess or distribute \
             controlled substances in Ohio. Category II covers dangerous drugs only.",
            Some(DecisionType::OhioTddd),
            Jurisdiction::state("OH"),
        ),
        entry(
            "kb-ohio-responsible-person",
            "Who can serve as the responsible person on an Ohio TDDD license?",
            "A licensed pharmacist or another licensed health professional authorized to \
             prescribe drugs, who is physically present at the location and accountable for \
             compliance with Chapter 4729.",
            Some(DecisionType::OhioTddd),
            Jurisdiction::state("OH"),
        ),
        entry(
            "kb-ny-triennial",
            "How often must a New York pharmacy registration be renewed?",
            "Every three years. The NYS Board of Pharmacy mails renewal forms before the current \
             registration period ends, and the supervising pharmacist must be identified on renewal.",
            Some(DecisionType::NyPharmacyLicense),
            Jurisdiction::state("NY"),
        ),
    ]
}

fn passage(
    doc_id: &str,
    doc_title: &str,
    jurisdiction: Jurisdiction,
    section: &str,
    snippet: &str,
) -> PassageDraft {
    PassageDraft {
        doc_id: doc_id.to_string(),
        doc_title: doc_title.to_string(),
        jurisdiction,
        section: section.to_string(),
        snippet: snippet.to_string(),
    }
}

pub fn standard_passages() -> Vec<PassageDraft> {
    let cfr = "21 CFR Part 1301 - Registration of Manufacturers, Distributors, and Dispensers";
    vec![
        passage(
            "cfr-1301-11",
            cfr,
            Jurisdiction::Federal,
            "21 CFR 1301.11",
            "Every person who manufactures, distributes, dispenses, imports, or exports any \
             controlled substance shall obtain a registration unless exempted by law.",
        ),
        passage(
            "cfr-1301-12",
            cfr,
            Jurisdiction::Federal,
            "21 CFR 1301.12",
            "A separate registration is required for each principal place of business at one \
             general physical location where controlled substances are manufactured, distributed, \
             or dispensed.",
        ),
        passage(
            "cfr-1301-13",
            cfr,
            Jurisdiction::Federal,
            "21 CFR 1301.13",
            "Any person required to be registered shall not engage in any activity for which \
             registration is required until the application for registration is granted and a \
             certificate of registration is issued.",
        ),
        passage(
            "cfr-1301-13-e",
            cfr,
            Jurisdiction::Federal,
            "21 CFR 1301.13(e)",
            "Registrations expire at the end of the registration period; a registrant should apply \
             for re-registration before the expiration date to avoid a lapse in authority.",
        ),
        passage(
            "cfr-1301-13-e-1",
            cfr,
            Jurisdiction::Federal,
            "21 CFR 1301.13(e)(1)",
            "A registrant may only handle the controlled substance schedules listed on the \
             certificate of registration.",
        ),
        passage(
            "cfr-1301-13-a",
            cfr,
            Jurisdiction::Global,
            "21 CFR 1301.13(a)",
            "Registration is conditioned on the applicant holding a current state license or \
             authorization to handle controlled substances in the jurisdiction of practice.",
        ),
        passage(
            "cfr-1301-75",
            "21 CFR Part 1301 - Security Requirements",
            Jurisdiction::Federal,
            "21 CFR 1301.75",
            "Controlled substances listed in Schedules I and II shall be stored in a securely \
             locked, substantially constructed cabinet.",
        ),
        passage(
            "cfr-1301-76",
            "21 CFR Part 1301 - Security Requirements",
            Jurisdiction::Federal,
            "21 CFR 1301.76",
            "The registrant shall not employ as an agent or employee who has access to controlled \
             substances any person who has been convicted of a felony relating to controlled \
             substances.",
        ),
        passage(
            "cfr-1305-03",
            "21 CFR Part 1305 - Orders for Schedule I and II Controlled Substances",
            Jurisdiction::Federal,
            "21 CFR 1305.03",
            "A DEA Form 222 or an electronic order (CSOS) is required for each distribution of a \
             Schedule I or II controlled substance.",
        ),
        passage(
            "usc-829-e",
            "21 U.S.C. 829 - Prescriptions",
            Jurisdiction::Federal,
            "21 U.S.C. 829(e)",
            "No controlled substance that is a prescription drug may be delivered, distributed, or \
             dispensed by means of the Internet without a valid prescription issued after an \
             in-person medical evaluation or a qualifying telemedicine exception.",
        ),
        passage(
            "orc-4729-54",
            "Ohio Revised Code 4729.54 - Terminal Distributor Licenses",
            Jurisdiction::state("OH"),
            "ORC 4729.54",
            "No person shall possess or sell dangerous drugs at retail unless licensed as a \
             terminal distributor of dangerous drugs by the state board of pharmacy.",
        ),
        passage(
            "orc-4729-54-c",
            "Ohio Revised Code 4729.54 - Terminal Distributor Licenses",
            Jurisdiction::state("OH"),
            "ORC 4729.54(C)",
            "Terminal distributor licenses are renewed biennially and must be renewed before the \
             license expires to continue possession of dangerous drugs.",
        ),
        passage(
            "oac-4729-5-3-01",
            "Ohio Administrative Code 4729:5-3",
            Jurisdiction::state("OH"),
            "OAC 4729:5-3-01",
            "A category III license authorizes the possession of controlled substances in addition \
             to dangerous drugs in categories I and II.",
        ),
        passage(
            "oac-4729-5-2-01",
            "Ohio Administrative Code 4729:5-2",
            Jurisdiction::state("OH"),
            "OAC 4729:5-2-01",
            "Each terminal distributor license shall identify a responsible person who is \
             accountable for the possession and control of dangerous drugs.",
        ),
        passage(
            "ny-educ-6808",
            "New York Education Law 6808 - Pharmacy Registration",
            Jurisdiction::state("NY"),
            "NY Educ. Law 6808",
            "No pharmacy shall be established or operated without a registration issued by the \
             department; registrations are issued for a three-year period.",
        ),
        passage(
            "ny-educ-6808-2-c",
            "New York Education Law 6808 - Pharmacy Registration",
            Jurisdiction::state("NY"),
            "NY Educ. Law 6808(2)(c)",
            "Every pharmacy shall be under the immediate supervision of a licensed pharmacist \
             identified to the department.",
        ),
        passage(
            "nycrr-63-6",
            "8 NYCRR Part 63 - Pharmacy",
            Jurisdiction::state("NY"),
            "8 NYCRR 63.6",
            "A pharmacy registration must be renewed before the end of the registration period; \
             operating on a lapsed registration is unprofessional conduct.",
        ),
        passage(
            "ny-phl-3302",
            "New York Public Health Law Article 33",
            Jurisdiction::state("NY"),
            "NY Pub. Health Law 3302",
            "Dispensing controlled substances requires a license issued by the Bureau of Narcotic \
             Enforcement in addition to the pharmacy registration.",
        ),
    ]
}
