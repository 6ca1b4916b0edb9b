use crate::decisions::domain::{Jurisdiction, Severity};

use super::{Predicate, Rule};

/// Ohio Terminal Distributor of Dangerous Drugs license checks.
pub(super) fn rules() -> Vec<Rule> {
    let ohio = Jurisdiction::state("OH");

    vec![
        Rule::builder(
            "oh_tddd_license_on_file",
            "TDDD license on file",
            Severity::Block,
        )
        .jurisdiction(ohio.clone())
        .citation("ORC 4729.54")
        .rationale("Ohio prohibits possessing dangerous drugs for sale or use without a terminal distributor license.")
        .requirement("A TDDD license number is on file.")
        .predicate(Predicate::present("tddd_license_number"))
        .narrative(
            "Ohio TDDD license on file",
            "The Ohio TDDD license number",
            "Record the Ohio Board of Pharmacy TDDD license number.",
        )
        .build(),
        Rule::builder(
            "oh_tddd_license_active",
            "TDDD license active",
            Severity::Block,
        )
        .jurisdiction(ohio.clone())
        .citation("ORC 4729.54")
        .rationale("Only an active license authorizes receipt of dangerous drugs.")
        .requirement("TDDD license status is Active and not expired.")
        .predicate(Predicate::all(vec![
            Predicate::text_in("tddd_license_status", &["Active"]),
            Predicate::at_least("tddd_expiry_days", 1.0),
        ]))
        .narrative(
            "Ohio TDDD license active",
            "An active, unexpired Ohio TDDD license",
            "Verify the TDDD license on the Ohio eLicense portal and renew if lapsed.",
        )
        .build(),
        Rule::builder(
            "oh_tddd_category_controlled",
            "Category III for controlled substances",
            Severity::Block,
        )
        .jurisdiction(ohio.clone())
        .citation("OAC 4729:5-3-01")
        .rationale("Only category III terminal distributors may possess controlled substances.")
        .requirement("Licensees handling controlled substances hold a category III license.")
        .predicate(Predicate::when(
            Predicate::is_true("handles_controlled_substances"),
            Predicate::text_in("tddd_category", &["III", "3"]),
        ))
        .narrative(
            "TDDD category covers controlled substances",
            "A category III TDDD license for controlled-substance handling",
            "Apply for a category III TDDD license before ordering controlled substances.",
        )
        .build(),
        Rule::builder(
            "oh_tddd_expiry_buffer",
            "TDDD renewal window",
            Severity::Review,
        )
        .jurisdiction(ohio.clone())
        .citation("ORC 4729.54(C)")
        .rationale("Ohio TDDD licenses expire annually and renewals filed late lapse.")
        .requirement("TDDD license remains valid for at least 30 more days.")
        .predicate(Predicate::at_least("tddd_expiry_days", 30.0))
        .narrative(
            "TDDD license valid for at least 30 days",
            "Confirmation of TDDD renewal",
            "Submit the TDDD renewal confirmation from the Ohio Board of Pharmacy.",
        )
        .build(),
        Rule::builder(
            "oh_tddd_responsible_person",
            "Responsible person on file",
            Severity::Review,
        )
        .jurisdiction(ohio.clone())
        .citation("OAC 4729:5-2-01")
        .rationale("Each terminal distributor must designate a responsible person with the Board.")
        .requirement("A responsible person is designated with the Ohio Board of Pharmacy.")
        .predicate(Predicate::present("responsible_person_name"))
        .narrative(
            "Responsible person designated with the Board",
            "The responsible person's name",
            "Name the responsible person registered with the Ohio Board of Pharmacy.",
        )
        .build(),
        Rule::builder(
            "oh_tddd_change_notice",
            "Change notification window",
            Severity::Info,
        )
        .jurisdiction(ohio)
        .citation("OAC 4729:5-2-03")
        .rationale("Ownership, address and responsible-person changes must be reported to the Board.")
        .requirement("Changes are reported to the Board within 30 days.")
        .predicate(Predicate::is_true("change_notice_acknowledged"))
        .narrative("Change notification obligations acknowledged", "", "")
        .build(),
    ]
}
