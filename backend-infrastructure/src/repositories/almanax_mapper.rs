// Joined row -> MappedAlmanax
// Column aliases are prefixed per table: a_ almanax, b_ bonus, bt_ bonus_types, t_ tribute

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use backend_domain::{Almanax, Bonus, BonusType, MappedAlmanax, Tribute};

pub const MAPPED_ALMANAX_COLUMNS: &str = "
    a.id AS a_id, a.bonus_id AS a_bonus_id, a.tribute_id AS a_tribute_id, a.date AS a_date,
    a.reward_kamas AS a_reward_kamas, a.created_at AS a_created_at,
    a.updated_at AS a_updated_at, a.deleted_at AS a_deleted_at,
    b.id AS b_id, b.bonus_type_id AS b_bonus_type_id,
    b.description_en AS b_description_en, b.description_fr AS b_description_fr,
    b.description_es AS b_description_es, b.description_de AS b_description_de,
    b.description_it AS b_description_it, b.description_pt AS b_description_pt,
    b.created_at AS b_created_at, b.updated_at AS b_updated_at, b.deleted_at AS b_deleted_at,
    bt.id AS bt_id, bt.name_id AS bt_name_id,
    bt.name_en AS bt_name_en, bt.name_fr AS bt_name_fr, bt.name_es AS bt_name_es,
    bt.name_de AS bt_name_de, bt.name_it AS bt_name_it, bt.name_pt AS bt_name_pt,
    bt.created_at AS bt_created_at, bt.updated_at AS bt_updated_at, bt.deleted_at AS bt_deleted_at,
    t.id AS t_id,
    t.item_name_en AS t_item_name_en, t.item_name_fr AS t_item_name_fr,
    t.item_name_es AS t_item_name_es, t.item_name_de AS t_item_name_de,
    t.item_name_it AS t_item_name_it, t.item_name_pt AS t_item_name_pt,
    t.item_icon AS t_item_icon, t.item_sd AS t_item_sd, t.item_hq AS t_item_hq,
    t.item_hd AS t_item_hd, t.item_ankama_id AS t_item_ankama_id,
    t.item_subtype AS t_item_subtype, t.item_doduapi_uri AS t_item_doduapi_uri,
    t.quantity AS t_quantity,
    t.created_at AS t_created_at, t.updated_at AS t_updated_at, t.deleted_at AS t_deleted_at";

pub fn map_almanax_row(row: &SqliteRow) -> Result<MappedAlmanax, sqlx::Error> {
    Ok(MappedAlmanax {
        almanax: Almanax {
            id: row.try_get("a_id")?,
            bonus_id: row.try_get("a_bonus_id")?,
            tribute_id: row.try_get("a_tribute_id")?,
            date: row.try_get("a_date")?,
            reward_kamas: row.try_get("a_reward_kamas")?,
            created_at: row.try_get("a_created_at")?,
            updated_at: row.try_get("a_updated_at")?,
            deleted_at: row.try_get("a_deleted_at")?,
        },
        bonus: Bonus {
            id: row.try_get("b_id")?,
            bonus_type_id: row.try_get("b_bonus_type_id")?,
            description_en: row.try_get("b_description_en")?,
            description_fr: row.try_get("b_description_fr")?,
            description_es: row.try_get("b_description_es")?,
            description_de: row.try_get("b_description_de")?,
            description_it: row.try_get("b_description_it")?,
            description_pt: row.try_get("b_description_pt")?,
            created_at: row.try_get("b_created_at")?,
            updated_at: row.try_get("b_updated_at")?,
            deleted_at: row.try_get("b_deleted_at")?,
        },
        bonus_type: BonusType {
            id: row.try_get("bt_id")?,
            name_id: row.try_get("bt_name_id")?,
            name_en: row.try_get("bt_name_en")?,
            name_fr: row.try_get("bt_name_fr")?,
            name_es: row.try_get("bt_name_es")?,
            name_de: row.try_get("bt_name_de")?,
            name_it: row.try_get("bt_name_it")?,
            name_pt: row.try_get("bt_name_pt")?,
            created_at: row.try_get("bt_created_at")?,
            updated_at: row.try_get("bt_updated_at")?,
            deleted_at: row.try_get("bt_deleted_at")?,
        },
        tribute: Tribute {
            id: row.try_get("t_id")?,
            item_name_en: row.try_get("t_item_name_en")?,
            item_name_fr: row.try_get("t_item_name_fr")?,
            item_name_es: row.try_get("t_item_name_es")?,
            item_name_de: row.try_get("t_item_name_de")?,
            item_name_it: row.try_get("t_item_name_it")?,
            item_name_pt: row.try_get("t_item_name_pt")?,
            item_icon: row.try_get("t_item_icon")?,
            item_sd: row.try_get("t_item_sd")?,
            item_hq: row.try_get("t_item_hq")?,
            item_hd: row.try_get("t_item_hd")?,
            item_ankama_id: row.try_get("t_item_ankama_id")?,
            item_subtype: row.try_get("t_item_subtype")?,
            item_doduapi_uri: row.try_get("t_item_doduapi_uri")?,
            quantity: row.try_get("t_quantity")?,
            created_at: row.try_get("t_created_at")?,
            updated_at: row.try_get("t_updated_at")?,
            deleted_at: row.try_get("t_deleted_at")?,
        },
    })
}

pub fn map_bonus_type_row(row: &SqliteRow) -> Result<BonusType, sqlx::Error> {
    Ok(BonusType {
        id: row.try_get("id")?,
        name_id: row.try_get("name_id")?,
        name_en: row.try_get("name_en")?,
        name_fr: row.try_get("name_fr")?,
        name_es: row.try_get("name_es")?,
        name_de: row.try_get("name_de")?,
        name_it: row.try_get("name_it")?,
        name_pt: row.try_get("name_pt")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::sqlite_repo::tests::{memory_repo, seed};
    use backend_domain::{AlmanaxRepository, NewAlmanax};

    #[tokio::test]
    async fn maps_every_column_including_deletion_time() {
        let repo = memory_repo().await;
        let (bonus_id, tribute_id) = seed(&repo, "experience").await;
        let id = repo
            .create(&NewAlmanax {
                bonus_id,
                tribute_id,
                date: "2024-05-01".to_string(),
                reward_kamas: 1337,
            })
            .await
            .expect("create");
        let pool = repo.pool().await.expect("pool");
        sqlx::query("UPDATE almanax SET deleted_at = '2024-05-02 10:00:00' WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .expect("soft delete");

        let sql = format!(
            "SELECT {} FROM almanax AS a
             JOIN bonus AS b ON a.bonus_id = b.id
             JOIN bonus_types AS bt ON b.bonus_type_id = bt.id
             JOIN tribute AS t ON a.tribute_id = t.id",
            MAPPED_ALMANAX_COLUMNS
        );
        let row = sqlx::query(&sql).fetch_one(pool).await.expect("row");
        let mapped = map_almanax_row(&row).expect("mapped");

        assert_eq!(mapped.almanax.id, id);
        assert_eq!(mapped.almanax.reward_kamas, 1337);
        assert_eq!(
            mapped.almanax.deleted_at.map(|ts| ts.to_string()),
            Some("2024-05-02 10:00:00".to_string())
        );
        assert!(mapped.bonus.deleted_at.is_none());
        assert_eq!(mapped.bonus.bonus_type_id, mapped.bonus_type.id);
        assert_eq!(mapped.bonus.description_it, "Più esperienza");
        assert_eq!(mapped.bonus.description_pt, "Mais experiência");
        assert_eq!(mapped.bonus_type.name_pt, "experience pt");
        assert_eq!(mapped.tribute.item_name_de, "Weizen");
        assert_eq!(mapped.tribute.item_hd, "https://img/289-hd.png");
        assert_eq!(mapped.tribute.item_ankama_id, 289);
        assert_eq!(mapped.tribute.item_subtype, "resources");
        assert_eq!(mapped.tribute.item_doduapi_uri, "/dofus3/v1/en/items/resources/289");
        assert!(mapped.tribute.created_at <= mapped.tribute.updated_at);
    }
}
