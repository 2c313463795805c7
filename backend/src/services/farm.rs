//! Farm service for farm records and the neighbouring-farms map

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_coordinates, Farm, GpsCoordinates, NearbyFarm, RiskScore,
    DEFAULT_HISTORY_MULTIPLIER,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Default search radius for neighbouring farms
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 50.0;

const DEFAULT_FARM_NAME: &str = "Fazenda Boa Vista";
const DEFAULT_FARM_OWNER: &str = "João Mendes";

/// Farm service for managing farms
#[derive(Clone)]
pub struct FarmService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FarmRow {
    id: Uuid,
    name: String,
    owner: Option<String>,
    risk: i16,
    history_multiplier: f64,
    latitude: Decimal,
    longitude: Decimal,
    total_animals: i32,
    area_hectares: Option<Decimal>,
    contact: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FarmRow> for Farm {
    fn from(row: FarmRow) -> Self {
        Farm {
            id: row.id,
            name: row.name,
            owner: row.owner,
            risk: RiskScore::from_f64(f64::from(row.risk)),
            history_multiplier: row.history_multiplier,
            coordinates: GpsCoordinates::new(row.latitude, row.longitude),
            total_animals: row.total_animals,
            area_hectares: row.area_hectares,
            contact: row.contact,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a farm. New farms always start unscored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateFarmInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 120))]
    pub owner: Option<String>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub area_hectares: Option<Decimal>,
    #[validate(length(max = 40))]
    pub contact: Option<String>,
}

const FARM_COLUMNS: &str = "id, name, owner, risk, history_multiplier, latitude, longitude, \
     total_animals, area_hectares, contact, created_at, updated_at";

/// Fail with NotFound unless the farm exists
pub async fn ensure_farm_exists(db: &PgPool, farm_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM farms WHERE id = $1)")
        .bind(farm_id)
        .fetch_one(db)
        .await?;

    if !exists {
        return Err(AppError::NotFound("Farm".to_string()));
    }
    Ok(())
}

/// Sort farms by distance from `origin`, dropping those beyond `radius_km`
pub fn nearest_farms(
    farms: &[Farm],
    origin: &GpsCoordinates,
    radius_km: f64,
    exclude: Option<Uuid>,
) -> Vec<NearbyFarm> {
    let mut nearby: Vec<NearbyFarm> = farms
        .iter()
        .filter(|farm| Some(farm.id) != exclude)
        .map(|farm| NearbyFarm::from_farm(farm, origin))
        .filter(|farm| farm.distance_km <= radius_km)
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

impl FarmService {
    /// Create a new FarmService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all farms
    pub async fn list_farms(&self) -> AppResult<Vec<Farm>> {
        let rows = sqlx::query_as::<_, FarmRow>(&format!(
            "SELECT {} FROM farms ORDER BY name ASC",
            FARM_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Farm::from).collect())
    }

    /// Get a farm by ID
    pub async fn get_farm(&self, farm_id: Uuid) -> AppResult<Farm> {
        let row = sqlx::query_as::<_, FarmRow>(&format!(
            "SELECT {} FROM farms WHERE id = $1",
            FARM_COLUMNS
        ))
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        Ok(row.into())
    }

    /// Create a farm
    pub async fn create_farm(&self, input: CreateFarmInput) -> AppResult<Farm> {
        input.validate()?;
        validate_coordinates(input.latitude, input.longitude).map_err(|e| {
            AppError::invalid("coordinates", e, "Coordenadas inválidas")
        })?;

        let row = sqlx::query_as::<_, FarmRow>(&format!(
            r#"
            INSERT INTO farms (name, owner, risk, history_multiplier, latitude, longitude,
                               area_hectares, contact)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            FARM_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.owner)
        .bind(i16::from(RiskScore::ZERO.value()))
        .bind(DEFAULT_HISTORY_MULTIPLIER)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.area_hectares)
        .bind(&input.contact)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created farm {} ({})", row.name, row.id);
        Ok(row.into())
    }

    /// Farms within `radius_km` of a point, nearest first
    pub async fn nearby_farms(
        &self,
        origin: GpsCoordinates,
        radius_km: f64,
        exclude: Option<Uuid>,
    ) -> AppResult<Vec<NearbyFarm>> {
        validate_coordinates(origin.latitude, origin.longitude)
            .map_err(|e| AppError::invalid("coordinates", e, "Coordenadas inválidas"))?;

        let farms = self.list_farms().await?;
        Ok(nearest_farms(&farms, &origin, radius_km, exclude))
    }

    /// Recount the animals registered on a farm
    pub async fn refresh_animal_count(&self, farm_id: Uuid) -> AppResult<i32> {
        let total = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE farms
            SET total_animals = (SELECT COUNT(*)::int FROM animals WHERE farm_id = $1),
                updated_at = NOW()
            WHERE id = $1
            RETURNING total_animals
            "#,
        )
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        Ok(total)
    }

    /// Farm the mobile app opens by default, created on first use
    pub async fn ensure_default_farm(&self) -> AppResult<Farm> {
        let existing = sqlx::query_as::<_, FarmRow>(&format!(
            "SELECT {} FROM farms WHERE name = $1 ORDER BY created_at ASC LIMIT 1",
            FARM_COLUMNS
        ))
        .bind(DEFAULT_FARM_NAME)
        .fetch_optional(&self.db)
        .await?;

        if let Some(row) = existing {
            return Ok(row.into());
        }

        self.create_farm(CreateFarmInput {
            name: DEFAULT_FARM_NAME.to_string(),
            owner: Some(DEFAULT_FARM_OWNER.to_string()),
            latitude: Decimal::new(-21244, 3),
            longitude: Decimal::new(-45147, 3),
            area_hectares: None,
            contact: None,
        })
        .await
    }

    /// Insert the demo farms that are missing, by name
    pub async fn seed_demo_farms(&self) -> AppResult<usize> {
        let mut inserted = 0;

        for demo in demo_farms() {
            let result = sqlx::query(
                r#"
                INSERT INTO farms (name, risk, latitude, longitude, total_animals,
                                   area_hectares, contact)
                SELECT $1, $2, $3, $4, $5, $6, $7
                WHERE NOT EXISTS (SELECT 1 FROM farms WHERE name = $1)
                "#,
            )
            .bind(demo.name)
            .bind(demo.risk)
            .bind(Decimal::new(demo.latitude_e2, 2))
            .bind(Decimal::new(demo.longitude_e2, 2))
            .bind(demo.total_animals)
            .bind(Decimal::from(demo.area_hectares))
            .bind(demo.contact)
            .execute(&self.db)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        if inserted > 0 {
            tracing::info!("Seeded {} demo farms", inserted);
        }
        Ok(inserted)
    }
}

struct DemoFarm {
    name: &'static str,
    risk: i16,
    latitude_e2: i64,
    longitude_e2: i64,
    total_animals: i32,
    area_hectares: i64,
    contact: &'static str,
}

fn demo_farms() -> [DemoFarm; 5] {
    [
        DemoFarm {
            name: "Fazenda Boa Vista",
            risk: 78,
            latitude_e2: -2124,
            longitude_e2: -4515,
            total_animals: 145,
            area_hectares: 320,
            contact: "(35) 98888-1111",
        },
        DemoFarm {
            name: "Sítio Esperança",
            risk: 92,
            latitude_e2: -2125,
            longitude_e2: -4516,
            total_animals: 78,
            area_hectares: 180,
            contact: "(35) 98888-2222",
        },
        DemoFarm {
            name: "Fazenda Santa Fé",
            risk: 34,
            latitude_e2: -2123,
            longitude_e2: -4514,
            total_animals: 210,
            area_hectares: 450,
            contact: "(35) 98888-3333",
        },
        DemoFarm {
            name: "Rancho Alegre",
            risk: 45,
            latitude_e2: -2122,
            longitude_e2: -4513,
            total_animals: 92,
            area_hectares: 200,
            contact: "(35) 98888-4444",
        },
        DemoFarm {
            name: "Fazenda São José",
            risk: 67,
            latitude_e2: -2126,
            longitude_e2: -4514,
            total_animals: 167,
            area_hectares: 380,
            contact: "(35) 98888-5555",
        },
    ]
}
