use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_profiles_table::Migration),
            Box::new(m20240101_000003_create_hotels_table::Migration),
            Box::new(m20240101_000004_create_reviews_table::Migration),
            Box::new(m20240101_000005_create_bookings_table::Migration),
            Box::new(m20240101_000006_create_settings_table::Migration),
            Box::new(m20240101_000007_create_webhook_events_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string()
                                .not_null()
                                .default("user"),
                        )
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_profiles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_profiles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Profiles::UserId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Profiles::Phone).string().null())
                        .col(ColumnDef::new(Profiles::Avatar).string().null())
                        .col(ColumnDef::new(Profiles::DateOfBirth).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Profiles::Address).string().null())
                        .col(ColumnDef::new(Profiles::Preferences).json().not_null())
                        .col(
                            ColumnDef::new(Profiles::LoyaltyPoints)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Profiles::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Profiles::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        UserId,
        Phone,
        Avatar,
        DateOfBirth,
        Address,
        Preferences,
        LoyaltyPoints,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_hotels_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_hotels_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Hotels::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Hotels::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Hotels::Name).string().not_null())
                        .col(ColumnDef::new(Hotels::Description).string().not_null())
                        .col(ColumnDef::new(Hotels::Images).json().not_null())
                        .col(ColumnDef::new(Hotels::City).string().not_null())
                        .col(ColumnDef::new(Hotels::State).string().null())
                        .col(ColumnDef::new(Hotels::Country).string().not_null())
                        .col(ColumnDef::new(Hotels::Address).string().not_null())
                        .col(
                            ColumnDef::new(Hotels::Rating)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Hotels::ReviewCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Hotels::Amenities).json().not_null())
                        .col(ColumnDef::new(Hotels::Rooms).json().not_null())
                        .col(ColumnDef::new(Hotels::PricePerNight).decimal().not_null())
                        .col(
                            ColumnDef::new(Hotels::Featured)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Hotels::CancellationPolicy)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Hotels::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Hotels::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_hotels_city")
                        .table(Hotels::Table)
                        .col(Hotels::City)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_hotels_featured")
                        .table(Hotels::Table)
                        .col(Hotels::Featured)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Hotels::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Hotels {
        Table,
        Id,
        Name,
        Description,
        Images,
        City,
        State,
        Country,
        Address,
        Rating,
        ReviewCount,
        Amenities,
        Rooms,
        PricePerNight,
        Featured,
        CancellationPolicy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_reviews_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_reviews_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Reviews::HotelId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::UserName).string().not_null())
                        .col(ColumnDef::new(Reviews::Rating).decimal().not_null())
                        .col(ColumnDef::new(Reviews::Comment).string().not_null())
                        .col(ColumnDef::new(Reviews::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_hotel_id")
                        .table(Reviews::Table)
                        .col(Reviews::HotelId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Reviews {
        Table,
        Id,
        HotelId,
        UserName,
        Rating,
        Comment,
        CreatedAt,
    }
}

mod m20240101_000005_create_bookings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_bookings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bookings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bookings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bookings::UserId).uuid().not_null())
                        .col(ColumnDef::new(Bookings::HotelId).uuid().not_null())
                        .col(ColumnDef::new(Bookings::RoomId).string().not_null())
                        .col(ColumnDef::new(Bookings::HotelName).string().not_null())
                        .col(ColumnDef::new(Bookings::HotelImage).string().not_null())
                        .col(ColumnDef::new(Bookings::Location).string().not_null())
                        .col(ColumnDef::new(Bookings::RoomType).string().not_null())
                        .col(ColumnDef::new(Bookings::CheckIn).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Bookings::CheckOut).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Bookings::Guests).integer().not_null())
                        .col(ColumnDef::new(Bookings::Price).decimal().not_null())
                        .col(
                            ColumnDef::new(Bookings::Status)
                                .string()
                                .not_null()
                                .default("Confirmed"),
                        )
                        .col(
                            ColumnDef::new(Bookings::PaymentStatus)
                                .string()
                                .not_null()
                                .default("Paid"),
                        )
                        .col(ColumnDef::new(Bookings::PaymentOrderId).string().null())
                        .col(ColumnDef::new(Bookings::PaymentId).string().null())
                        .col(ColumnDef::new(Bookings::PaidAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Bookings::SpecialRequests).string().null())
                        .col(ColumnDef::new(Bookings::CancellationReason).string().null())
                        .col(ColumnDef::new(Bookings::CancelledAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Bookings::BookingDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Bookings::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Bookings::UpdatedAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(Bookings::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bookings_user_id")
                        .table(Bookings::Table)
                        .col(Bookings::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bookings_status")
                        .table(Bookings::Table)
                        .col(Bookings::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bookings_payment_order_id")
                        .table(Bookings::Table)
                        .col(Bookings::PaymentOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Bookings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Bookings {
        Table,
        Id,
        UserId,
        HotelId,
        RoomId,
        HotelName,
        HotelImage,
        Location,
        RoomType,
        CheckIn,
        CheckOut,
        Guests,
        Price,
        Status,
        PaymentStatus,
        PaymentOrderId,
        PaymentId,
        PaidAt,
        SpecialRequests,
        CancellationReason,
        CancelledAt,
        BookingDate,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240101_000006_create_settings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_settings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Settings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Settings::Id)
                                .integer()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Settings::SiteName).string().not_null())
                        .col(ColumnDef::new(Settings::SupportEmail).string().not_null())
                        .col(ColumnDef::new(Settings::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Settings::TaxRate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Settings::CancellationWindowHours)
                                .big_integer()
                                .not_null()
                                .default(24),
                        )
                        .col(
                            ColumnDef::new(Settings::MaintenanceMode)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Settings::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Settings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Settings {
        Table,
        Id,
        SiteName,
        SupportEmail,
        Currency,
        TaxRate,
        CancellationWindowHours,
        MaintenanceMode,
        UpdatedAt,
    }
}

mod m20240101_000007_create_webhook_events_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_webhook_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WebhookEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WebhookEvents::EventId)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WebhookEvents::EventType).string().not_null())
                        .col(ColumnDef::new(WebhookEvents::BookingId).uuid().null())
                        .col(
                            ColumnDef::new(WebhookEvents::ReceivedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WebhookEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WebhookEvents {
        Table,
        EventId,
        EventType,
        BookingId,
        ReceivedAt,
    }
}
