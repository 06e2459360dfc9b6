use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (brand, generic, indications, standard dosage, precautions)
const CATALOG: &[(&str, &str, &str, &str, &str)] = &[
    ("Dolo 650", "Paracetamol", "Fever, mild pain", "650 mg every 6-8 hours", "Avoid overdose; monitor liver disease"),
    ("Crocin Advance", "Paracetamol", "Fever, headache", "500 mg every 6 hours", "Do not exceed daily max dose"),
    ("Augmentin 625", "Amoxicillin + Clavulanic Acid", "Bacterial infections", "1 tablet every 12 hours", "Complete course; watch penicillin allergy"),
    ("Azithral 500", "Azithromycin", "Respiratory infections", "500 mg once daily", "Take before food if tolerated"),
    ("Pantocid 40", "Pantoprazole", "Acidity, GERD", "40 mg once daily before breakfast", "Long-term use may lower magnesium"),
    ("Rantac", "Ranitidine", "Acid reflux", "150 mg twice daily", "Use alternatives where restricted"),
    ("Glycomet 500", "Metformin", "Type 2 diabetes", "500 mg once or twice daily with meals", "Monitor renal function"),
    ("Amaryl 1", "Glimepiride", "Type 2 diabetes", "1 mg once daily", "Risk of hypoglycemia"),
    ("Telma 40", "Telmisartan", "Hypertension", "40 mg once daily", "Monitor kidney function and potassium"),
    ("Amlong 5", "Amlodipine", "Hypertension", "5 mg once daily", "May cause ankle swelling"),
    ("Ecosprin 75", "Aspirin", "Antiplatelet therapy", "75 mg once daily", "Avoid in active bleeding"),
    ("Atorva 10", "Atorvastatin", "High cholesterol", "10 mg at bedtime", "Monitor liver enzymes"),
    ("Montek LC", "Montelukast + Levocetirizine", "Allergic rhinitis", "1 tablet at night", "May cause drowsiness"),
    ("Cetzine", "Cetirizine", "Allergy symptoms", "10 mg once daily", "Sedation in some patients"),
    ("Becosules", "Vitamin B-Complex", "Nutritional deficiency", "1 capsule once daily", "Use as supplement only"),
    ("Shelcal 500", "Calcium + Vitamin D3", "Bone health", "1 tablet once daily", "Take after meals"),
    ("Zifi 200", "Cefixime", "Bacterial infections", "200 mg twice daily", "Adjust dose in renal disease"),
    ("Omez D", "Omeprazole + Domperidone", "GERD, nausea", "1 capsule before breakfast", "Avoid prolonged unsupervised use"),
    ("Volini Gel", "Diclofenac (topical)", "Muscle pain", "Apply thin layer 2-3 times daily", "Do not apply on open wounds"),
    ("Calpol 250", "Paracetamol", "Pediatric fever", "Weight-based dosing", "Use measured pediatric dosing"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Medicines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Medicines::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Medicines::BrandName).string().not_null())
                    .col(ColumnDef::new(Medicines::GenericName).string().not_null())
                    .col(ColumnDef::new(Medicines::Indications).text())
                    .col(ColumnDef::new(Medicines::StandardDosage).text())
                    .col(ColumnDef::new(Medicines::Precautions).text())
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Medicines::Table).columns([
            Medicines::BrandName,
            Medicines::GenericName,
            Medicines::Indications,
            Medicines::StandardDosage,
            Medicines::Precautions,
        ]);
        for &(brand, generic, indications, dosage, precautions) in CATALOG {
            seed.values_panic([
                brand.into(),
                generic.into(),
                indications.into(),
                dosage.into(),
                precautions.into(),
            ]);
        }
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Medicines::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Medicines {
    Table,
    Id,
    BrandName,
    GenericName,
    Indications,
    StandardDosage,
    Precautions,
}
