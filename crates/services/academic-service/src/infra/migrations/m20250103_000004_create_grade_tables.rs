use sea_orm_migration::{prelude::*, schema::*};

use super::m20250103_000003_create_exams_table::Exams;

static FK_GRADES_EXAM_ID: &str = "fk_grades_exam_id";
static FK_GRADE_OBJECTIONS_GRADE_ID: &str = "fk_grade_objections_grade_id";
static IDX_GRADES_EXAM_STUDENT: &str = "idx_grades_exam_student";
static IDX_GRADES_STUDENT_ID: &str = "idx_grades_student_id";
static IDX_GRADE_OBJECTIONS_STATUS: &str = "idx_grade_objections_status";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(pk_uuid(Grades::Id))
                    .col(uuid(Grades::ExamId))
                    .col(uuid(Grades::StudentId))
                    .col(double(Grades::Score))
                    .col(uuid_null(Grades::GradedBy))
                    .col(timestamp_with_time_zone(Grades::GradedAt))
                    .col(timestamp_with_time_zone(Grades::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_GRADES_EXAM_ID)
                            .from(Grades::Table, Grades::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_GRADES_EXAM_STUDENT)
                    .table(Grades::Table)
                    .col(Grades::ExamId)
                    .col(Grades::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_GRADES_STUDENT_ID)
                    .table(Grades::Table)
                    .col(Grades::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GradeObjections::Table)
                    .if_not_exists()
                    .col(pk_uuid(GradeObjections::Id))
                    .col(uuid(GradeObjections::GradeId))
                    .col(uuid(GradeObjections::StudentId))
                    .col(text(GradeObjections::Reason))
                    .col(string(GradeObjections::Status))
                    .col(text_null(GradeObjections::Response))
                    .col(uuid_null(GradeObjections::ReviewedBy))
                    .col(double(GradeObjections::OriginalScore))
                    .col(double_null(GradeObjections::RevisedScore))
                    .col(timestamp_with_time_zone(GradeObjections::CreatedAt))
                    .col(timestamp_with_time_zone_null(GradeObjections::ResolvedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_GRADE_OBJECTIONS_GRADE_ID)
                            .from(GradeObjections::Table, GradeObjections::GradeId)
                            .to(Grades::Table, Grades::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_GRADE_OBJECTIONS_STATUS)
                    .table(GradeObjections::Table)
                    .col(GradeObjections::Status)
                    .col(GradeObjections::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GradeObjections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Grades {
    Table,
    Id,
    ExamId,
    StudentId,
    Score,
    GradedBy,
    GradedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeObjections {
    Table,
    Id,
    GradeId,
    StudentId,
    Reason,
    Status,
    Response,
    ReviewedBy,
    OriginalScore,
    RevisedScore,
    CreatedAt,
    ResolvedAt,
}
