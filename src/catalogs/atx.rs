//! Atomic Shop item catalog / Каталог предметов Атомной лавки
//!
//! `items` is a plain table with a separate FTS5 index `items_fts` keyed on
//! `formId`. The index is only joined when a free-text filter is applied.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use super::row_to_json;
use crate::search::{
    build_plan, execute, CatalogSchema, NamedSort, Pagination, Paging, PlanParam, Predicate,
    SearchError, SearchRequest, SearchResult, SortSpec, TermRouting, TextIndex,
};
use crate::utils::{parse_positive_int, split_list};

pub const ITEMS: CatalogSchema = CatalogSchema {
    table: "items",
    alias: Some("i"),
    columns: &[
        "formId",
        "nameEn",
        "nameRu",
        "mainImage",
        "categoryFormId",
        "subcategoryFormId",
        "slug",
    ],
    sortable: &["orderByName", "orderByFormId"],
    index: TextIndex::External { name: "items_fts", key: "formId" },
    routing: TermRouting::Whole,
    fields: &[],
    facet_column: None,
};

/// Named `order` values, newest first by default / Ключи сортировки
pub const ITEM_ORDERS: NamedSort = NamedSort::new(
    &[
        ("date_desc", SortSpec::desc("orderByFormId")),
        ("date_asc", SortSpec::asc("orderByFormId")),
        ("name_desc", SortSpec::desc("orderByName")),
        ("name_asc", SortSpec::asc("orderByName")),
    ],
    SortSpec::desc("orderByFormId"),
);

/// Filters this short are ignored
pub const MIN_FILTER_CHARS: usize = 2;

/// Item as shown in listings / Предмет в списке
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ItemSummary {
    pub form_id: String,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub main_image: Option<String>,
    pub category_form_id: Option<String>,
    pub subcategory_form_id: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Category {
    pub form_id: String,
    pub editor_id: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub slug: Option<String>,
    pub order_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Subcategory {
    pub form_id: String,
    pub editor_id: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub slug: Option<String>,
    pub parent_category_form_id: Option<String>,
    pub parent_category_editor_id: Option<String>,
    pub order_id: Option<i64>,
}

/// Short reference attached to an item detail / Краткая ссылка на категорию
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct CategoryRef {
    pub form_id: String,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithSubcategories {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemList {
    pub items: Vec<ItemSummary>,
    pub pagination: Pagination,
}

impl From<SearchResult<ItemSummary>> for ItemList {
    fn from(result: SearchResult<ItemSummary>) -> Self {
        let pagination = result.pagination();
        Self {
            items: result.rows,
            pagination,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryItems {
    pub category: Category,
    #[serde(flatten)]
    pub list: ItemList,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryItems {
    pub subcategory: Subcategory,
    #[serde(flatten)]
    pub list: ItemList,
}

/// Listing parameters / Параметры списка
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemListQuery {
    pub page: i64,
    pub page_size: i64,
    pub filter: Option<String>,
    pub order: Option<String>,
    pub rarity: Option<i64>,
}

impl ItemListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);
        Self {
            page: parse_positive_int(get("page"), 1),
            page_size: parse_positive_int(get("page_size"), 10),
            filter: get("filter").map(str::to_string),
            order: get("order").map(str::to_string),
            rarity: get("rarity").and_then(|r| r.trim().parse().ok()),
        }
    }

    /// Normalize into a search request / Преобразовать в поисковый запрос
    pub fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(Paging::page(self.page, self.page_size))
            .sort(Some(ITEM_ORDERS.resolve(self.order.as_deref())));
        if let Some(filter) = self
            .filter
            .as_deref()
            .filter(|f| f.chars().count() > MIN_FILTER_CHARS)
        {
            request = request.term(filter);
        }
        if let Some(rarity) = self.rarity {
            request = request.predicate(Predicate::Eq("rarity", PlanParam::Int(rarity)));
        }
        request
    }
}

async fn page_items(pool: &SqlitePool, request: SearchRequest) -> Result<ItemList, SearchError> {
    let plan = build_plan(&ITEMS, &request)?;
    Ok(execute::<ItemSummary>(pool, &plan).await?.into())
}

/// All items / Все предметы
pub async fn list_items(pool: &SqlitePool, query: &ItemListQuery) -> Result<ItemList, SearchError> {
    page_items(pool, query.to_request()).await
}

/// Items of one category, `None` if the category is unknown / Предметы категории
pub async fn category_items(
    pool: &SqlitePool,
    form_id: &str,
    query: &ItemListQuery,
) -> Result<Option<CategoryItems>, SearchError> {
    let Some(category) = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE formId = ?")
        .bind(form_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let request = query
        .to_request()
        .predicate(Predicate::Eq("categoryFormId", PlanParam::from(form_id)));
    let list = page_items(pool, request).await?;
    Ok(Some(CategoryItems { category, list }))
}

/// Items of one subcategory / Предметы подкатегории
pub async fn subcategory_items(
    pool: &SqlitePool,
    form_id: &str,
    query: &ItemListQuery,
) -> Result<Option<SubcategoryItems>, SearchError> {
    let Some(subcategory) =
        sqlx::query_as::<_, Subcategory>("SELECT * FROM subcategories WHERE formId = ?")
            .bind(form_id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let request = query
        .to_request()
        .predicate(Predicate::Eq("subcategoryFormId", PlanParam::from(form_id)));
    let list = page_items(pool, request).await?;
    Ok(Some(SubcategoryItems { subcategory, list }))
}

/// Category tree / Дерево категорий
///
/// Subcategories without a parent are not attached anywhere.
pub async fn categories_tree(pool: &SqlitePool) -> Result<Vec<CategoryWithSubcategories>, SearchError> {
    let (categories, subcategories) = tokio::try_join!(
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY orderId").fetch_all(pool),
        sqlx::query_as::<_, Subcategory>("SELECT * FROM subcategories ORDER BY orderId").fetch_all(pool),
    )?;

    let mut by_parent: HashMap<String, Vec<Subcategory>> = HashMap::new();
    for sub in subcategories {
        if let Some(parent) = sub.parent_category_form_id.clone() {
            by_parent.entry(parent).or_default().push(sub);
        }
    }

    Ok(categories
        .into_iter()
        .map(|category| CategoryWithSubcategories {
            subcategories: by_parent.remove(&category.form_id).unwrap_or_default(),
            category,
        })
        .collect())
}

async fn category_ref(
    pool: &SqlitePool,
    table: &'static str,
    form_id: Option<&str>,
) -> Result<Value, SearchError> {
    let Some(form_id) = form_id.filter(|id| !id.is_empty()) else {
        return Ok(Value::Null);
    };
    let sql = format!("SELECT formId, nameEn, nameRu, slug FROM {} WHERE formId = ?", table);
    let found = sqlx::query_as::<_, CategoryRef>(&sql)
        .bind(form_id)
        .fetch_optional(pool)
        .await?;
    Ok(found
        .and_then(|c| serde_json::to_value(c).ok())
        .unwrap_or(Value::Null))
}

/// Item detail / Карточка предмета
///
/// `screenshots` is stored `;`-joined and returned as a list; category and
/// subcategory are attached by point reads, `null` when absent.
pub async fn get_item(pool: &SqlitePool, form_id: &str) -> Result<Option<Map<String, Value>>, SearchError> {
    let Some(row) = sqlx::query("SELECT * FROM items WHERE formId = ?")
        .bind(form_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let mut item = row_to_json(&row);

    let screenshots = match item.get("screenshots") {
        Some(Value::String(raw)) if !raw.is_empty() => Some(split_list(raw, ';')),
        _ => None,
    };
    if let Some(list) = screenshots {
        item.insert("screenshots".to_string(), Value::from(list));
    }

    let category_id = item.get("categoryFormId").and_then(Value::as_str).map(str::to_string);
    let subcategory_id = item.get("subcategoryFormId").and_then(Value::as_str).map(str::to_string);
    let (category, subcategory) = tokio::try_join!(
        category_ref(pool, "categories", category_id.as_deref()),
        category_ref(pool, "subcategories", subcategory_id.as_deref()),
    )?;
    item.insert("category".to_string(), category);
    item.insert("subcategory".to_string(), subcategory);
    Ok(Some(item))
}
