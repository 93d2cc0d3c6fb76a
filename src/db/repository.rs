//! Database repository for CRUD operations.
//!
//! Uses prepared statements throughout. Writes that touch more than one
//! table (item creation and updates that replace tag associations) run
//! inside a single transaction.

use chrono::{Duration, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateItemRequest, CreateProductRequest, Item, ItemFilters, ItemWithTags, Priority, Product,
    Session, Tag, Todo, UpdateItemRequest, UpdateProductRequest, UpdateTagRequest,
    UpdateTodoRequest, User, DEFAULT_TAG_COLOR,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== SESSION OPERATIONS ====================

    /// Create a session for a user, valid for `ttl_hours`.
    pub async fn create_session(&self, user_id: i64, ttl_hours: i64) -> Result<Session, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = (now + Duration::hours(ttl_hours)).to_rfc3339();

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(now.to_rfc3339())
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            token,
            user_id,
            expires_at,
        })
    }

    /// Look up a session by token.
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query("SELECT token, user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
        }))
    }

    /// Delete a session. Deleting an unknown token is a no-op.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== USER OPERATIONS ====================

    /// List all users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            "SELECT id, email, username, first_name, last_name, avatar_url, email_verified, is_active, role, created_at, last_login_at FROM users ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Create a new user with an already-hashed password.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, AppError> {
        let existing = sqlx::query("SELECT id FROM users WHERE email = ? OR username = ?")
            .bind(email)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "Email or username already exists".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let avatar_url = format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", username);

        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, first_name, last_name, avatar_url, email_verified, is_active, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, 1, 'user', ?, ?)"
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(&avatar_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            username: username.to_string(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            avatar_url: Some(avatar_url),
            email_verified: false,
            is_active: true,
            role: "user".to_string(),
            created_at: now,
            last_login_at: None,
        })
    }

    /// Find a user by email, returning the stored password hash alongside.
    pub async fn find_user_for_login(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, username, first_name, last_name, avatar_url, email_verified, is_active, role, created_at, last_login_at, password_hash FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .as_ref()
            .map(|row| (user_from_row(row), row.get("password_hash"))))
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, id: i64) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a user. Owned todos, items, tags, and sessions are removed by
    /// schema-level cascade.
    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    // ==================== TODO OPERATIONS ====================

    /// List all todos for a user, newest first.
    pub async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, text, type, completed, created_at, updated_at FROM todos WHERE user_id = ? ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(todo_from_row).collect())
    }

    /// Get a todo by ID, scoped to its owner.
    pub async fn get_todo(&self, user_id: i64, id: i64) -> Result<Option<Todo>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, text, type, completed, created_at, updated_at FROM todos WHERE id = ? AND user_id = ?"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(todo_from_row))
    }

    /// Create a new todo.
    pub async fn create_todo(
        &self,
        user_id: i64,
        text: &str,
        todo_type: &str,
    ) -> Result<Todo, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO todos (user_id, text, type, completed, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?)"
        )
        .bind(user_id)
        .bind(text)
        .bind(todo_type)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Todo {
            id: result.last_insert_rowid(),
            user_id,
            text: text.to_string(),
            todo_type: todo_type.to_string(),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Partially update a todo; only supplied fields change.
    pub async fn update_todo(
        &self,
        user_id: i64,
        id: i64,
        request: &UpdateTodoRequest,
    ) -> Result<Todo, AppError> {
        let existing = self
            .get_todo(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Todo {} not found", id)))?;

        let now = Utc::now().to_rfc3339();
        let text = request.text.as_ref().unwrap_or(&existing.text);
        let todo_type = request.todo_type.as_ref().unwrap_or(&existing.todo_type);
        let completed = request.completed.unwrap_or(existing.completed);

        sqlx::query("UPDATE todos SET text = ?, type = ?, completed = ?, updated_at = ? WHERE id = ?")
            .bind(text)
            .bind(todo_type)
            .bind(completed as i32)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Todo {
            id,
            user_id,
            text: text.clone(),
            todo_type: todo_type.clone(),
            completed,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a todo.
    pub async fn delete_todo(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Todo {} not found", id)));
        }
        Ok(())
    }

    // ==================== ITEM OPERATIONS ====================

    /// List all non-archived items for a user, pinned first, then newest
    /// first, each enriched with its full tag set.
    pub async fn list_items(&self, user_id: i64) -> Result<Vec<ItemWithTags>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, content, item_type, completed, priority, due_date, pinned, archived, created_at, updated_at FROM items WHERE user_id = ? AND archived = 0 ORDER BY pinned DESC, created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<Item> = rows.iter().map(item_from_row).collect();
        self.with_tags(items).await
    }

    /// Get an item by ID, scoped to its owner, with tags attached.
    pub async fn get_item(&self, user_id: i64, id: i64) -> Result<Option<ItemWithTags>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, content, item_type, completed, priority, due_date, pinned, archived, created_at, updated_at FROM items WHERE id = ? AND user_id = ?"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row.as_ref().map(item_from_row) {
            Some(item) => {
                let tags = self.tags_for_item(item.id).await?;
                Ok(Some(ItemWithTags { item, tags }))
            }
            None => Ok(None),
        }
    }

    /// Create a new item, associating the requested tags in the same
    /// transaction.
    pub async fn create_item(
        &self,
        user_id: i64,
        content: &str,
        request: &CreateItemRequest,
    ) -> Result<ItemWithTags, AppError> {
        let now = Utc::now().to_rfc3339();
        let item_type = request.item_type.unwrap_or_default();
        let pinned = request.pinned.unwrap_or(false);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO items (user_id, content, item_type, completed, priority, due_date, pinned, archived, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?, ?, 0, ?, ?)"
        )
        .bind(user_id)
        .bind(content)
        .bind(item_type.as_str())
        .bind(request.priority.map(|p| p.as_str()))
        .bind(&request.due_date)
        .bind(pinned as i32)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let item_id = result.last_insert_rowid();

        if let Some(tag_ids) = &request.tags {
            for tag_id in tag_ids {
                // OR IGNORE: duplicate ids in the request are no-ops
                sqlx::query(
                    "INSERT OR IGNORE INTO item_tags (item_id, tag_id, created_at) VALUES (?, ?, ?)",
                )
                .bind(item_id)
                .bind(tag_id)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_item(user_id, item_id)
            .await?
            .ok_or_else(|| AppError::Internal("Created item could not be read back".to_string()))
    }

    /// Partially update an item. Supplied fields replace stored values;
    /// `priority` and `due_date` accept explicit null; a supplied `tags`
    /// list (even empty) replaces the whole association set. The row update
    /// and the association replacement share one transaction.
    pub async fn update_item(
        &self,
        user_id: i64,
        id: i64,
        request: &UpdateItemRequest,
    ) -> Result<ItemWithTags, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, user_id, content, item_type, completed, priority, due_date, pinned, archived, created_at, updated_at FROM items WHERE id = ? AND user_id = ?"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let existing = row
            .as_ref()
            .map(item_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;

        let now = Utc::now().to_rfc3339();
        let content = request.content.as_ref().unwrap_or(&existing.content);
        let item_type = request.item_type.unwrap_or(existing.item_type);
        let completed = request.completed.unwrap_or(existing.completed);
        let priority = request.priority.clone().resolve(existing.priority);
        let due_date = request.due_date.clone().resolve(existing.due_date.clone());
        let pinned = request.pinned.unwrap_or(existing.pinned);
        let archived = request.archived.unwrap_or(existing.archived);

        sqlx::query(
            "UPDATE items SET content = ?, item_type = ?, completed = ?, priority = ?, due_date = ?, pinned = ?, archived = ?, updated_at = ? WHERE id = ?"
        )
        .bind(content)
        .bind(item_type.as_str())
        .bind(completed as i32)
        .bind(priority.map(|p| p.as_str()))
        .bind(&due_date)
        .bind(pinned as i32)
        .bind(archived as i32)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(tag_ids) = &request.tags {
            sqlx::query("DELETE FROM item_tags WHERE item_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for tag_id in tag_ids {
                sqlx::query(
                    "INSERT OR IGNORE INTO item_tags (item_id, tag_id, created_at) VALUES (?, ?, ?)",
                )
                .bind(id)
                .bind(tag_id)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_item(user_id, id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated item could not be read back".to_string()))
    }

    /// Delete an item. Tag associations are removed by schema-level cascade.
    pub async fn delete_item(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {} not found", id)));
        }
        Ok(())
    }

    /// Search a user's items. All filters are ANDed; the tag filter joins
    /// the association table, deduplicated by item id; ordering matches
    /// `list_items`.
    pub async fn search_items(
        &self,
        user_id: i64,
        filters: &ItemFilters,
    ) -> Result<Vec<ItemWithTags>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT DISTINCT i.id, i.user_id, i.content, i.item_type, i.completed, i.priority, i.due_date, i.pinned, i.archived, i.created_at, i.updated_at FROM items i"
        );

        if !filters.tag_ids.is_empty() {
            qb.push(" INNER JOIN item_tags it ON i.id = it.item_id");
        }

        qb.push(" WHERE i.user_id = ").push_bind(user_id);

        if !filters.tag_ids.is_empty() {
            qb.push(" AND it.tag_id IN (");
            let mut separated = qb.separated(", ");
            for tag_id in &filters.tag_ids {
                separated.push_bind(*tag_id);
            }
            separated.push_unseparated(")");
        }

        if let Some(item_type) = filters.item_type {
            qb.push(" AND i.item_type = ").push_bind(item_type.as_str());
        }

        if let Some(completed) = filters.completed {
            qb.push(" AND i.completed = ").push_bind(completed as i32);
        }

        if let Some(archived) = filters.archived {
            qb.push(" AND i.archived = ").push_bind(archived as i32);
        }

        if let Some(pinned) = filters.pinned {
            qb.push(" AND i.pinned = ").push_bind(pinned as i32);
        }

        if let Some(search) = &filters.search {
            // SQLite LIKE is case-insensitive for ASCII
            qb.push(" AND i.content LIKE ")
                .push_bind(format!("%{}%", search));
        }

        qb.push(" ORDER BY i.pinned DESC, i.created_at DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let items: Vec<Item> = rows.iter().map(item_from_row).collect();
        self.with_tags(items).await
    }

    /// Fetch the tag set for each item.
    async fn with_tags(&self, items: Vec<Item>) -> Result<Vec<ItemWithTags>, AppError> {
        let mut enriched = Vec::with_capacity(items.len());
        for item in items {
            let tags = self.tags_for_item(item.id).await?;
            enriched.push(ItemWithTags { item, tags });
        }
        Ok(enriched)
    }

    /// All tags associated with one item.
    async fn tags_for_item(&self, item_id: i64) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query(
            "SELECT t.id, t.user_id, t.name, t.color, t.created_at FROM tags t INNER JOIN item_tags it ON t.id = it.tag_id WHERE it.item_id = ?"
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    // ==================== TAG OPERATIONS ====================

    /// List all tags for a user, alphabetical by name.
    pub async fn list_tags(&self, user_id: i64) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, color, created_at FROM tags WHERE user_id = ? ORDER BY name ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    /// Get a tag by ID, scoped to its owner.
    pub async fn get_tag(&self, user_id: i64, id: i64) -> Result<Option<Tag>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, name, color, created_at FROM tags WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(tag_from_row))
    }

    /// Create a new tag. `(owner, name)` must be unique.
    pub async fn create_tag(
        &self,
        user_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> Result<Tag, AppError> {
        let existing = sqlx::query("SELECT id FROM tags WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(
                "Tag with this name already exists".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let color = color.unwrap_or(DEFAULT_TAG_COLOR);

        let result =
            sqlx::query("INSERT INTO tags (user_id, name, color, created_at) VALUES (?, ?, ?, ?)")
                .bind(user_id)
                .bind(name)
                .bind(color)
                .bind(&now)
                .execute(&self.pool)
                .await?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            user_id,
            name: name.to_string(),
            color: color.to_string(),
            created_at: now,
        })
    }

    /// Partially update a tag. Renames re-check `(owner, name)` uniqueness.
    pub async fn update_tag(
        &self,
        user_id: i64,
        id: i64,
        request: &UpdateTagRequest,
    ) -> Result<Tag, AppError> {
        let existing = self
            .get_tag(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;

        if let Some(name) = &request.name {
            if *name != existing.name {
                let duplicate = sqlx::query("SELECT id FROM tags WHERE user_id = ? AND name = ?")
                    .bind(user_id)
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await?;
                if duplicate.is_some() {
                    return Err(AppError::Conflict(
                        "Tag with this name already exists".to_string(),
                    ));
                }
            }
        }

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let color = request.color.as_ref().unwrap_or(&existing.color);

        sqlx::query("UPDATE tags SET name = ?, color = ? WHERE id = ?")
            .bind(name)
            .bind(color)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Tag {
            id,
            user_id,
            name: name.clone(),
            color: color.clone(),
            created_at: existing.created_at,
        })
    }

    /// Delete a tag. Item associations are removed by schema-level cascade.
    pub async fn delete_tag(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }
        Ok(())
    }

    // ==================== PRODUCT OPERATIONS ====================

    /// List products, newest first, with optional category / substring /
    /// active filters.
    pub async fn list_products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Vec<Product>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, description, price, stock, category, image_url, is_active, created_at, updated_at FROM products WHERE 1 = 1"
        );

        if let Some(category) = category {
            qb.push(" AND category = ").push_bind(category);
        }

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(is_active) = is_active {
            qb.push(" AND is_active = ").push_bind(is_active as i32);
        }

        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(product_from_row).collect())
    }

    /// Get a product by ID.
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, price, stock, category, image_url, is_active, created_at, updated_at FROM products WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Create a new product.
    pub async fn create_product(
        &self,
        name: &str,
        price: f64,
        request: &CreateProductRequest,
    ) -> Result<Product, AppError> {
        let now = Utc::now().to_rfc3339();
        let stock = request.stock.unwrap_or(0);
        let category = request.category.as_deref().unwrap_or("general");
        let is_active = request.is_active.unwrap_or(true);

        let result = sqlx::query(
            "INSERT INTO products (name, description, price, stock, category, image_url, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(name)
        .bind(&request.description)
        .bind(price)
        .bind(stock)
        .bind(category)
        .bind(&request.image_url)
        .bind(is_active as i32)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            description: request.description.clone(),
            price,
            stock,
            category: category.to_string(),
            image_url: request.image_url.clone(),
            is_active,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Partially update a product.
    pub async fn update_product(
        &self,
        id: i64,
        request: &UpdateProductRequest,
    ) -> Result<Product, AppError> {
        let existing = self
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        let now = Utc::now().to_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let description = request
            .description
            .clone()
            .resolve(existing.description.clone());
        let price = request.price.unwrap_or(existing.price);
        let stock = request.stock.unwrap_or(existing.stock);
        let category = request.category.as_ref().unwrap_or(&existing.category);
        let image_url = request.image_url.clone().resolve(existing.image_url.clone());
        let is_active = request.is_active.unwrap_or(existing.is_active);

        sqlx::query(
            "UPDATE products SET name = ?, description = ?, price = ?, stock = ?, category = ?, image_url = ?, is_active = ?, updated_at = ? WHERE id = ?"
        )
        .bind(name)
        .bind(&description)
        .bind(price)
        .bind(stock)
        .bind(category)
        .bind(&image_url)
        .bind(is_active as i32)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: name.clone(),
            description,
            price,
            stock,
            category: category.clone(),
            image_url,
            is_active,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a product.
    pub async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let email_verified: i32 = row.get("email_verified");
    let is_active: i32 = row.get("is_active");
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar_url: row.get("avatar_url"),
        email_verified: email_verified != 0,
        is_active: is_active != 0,
        role: row.get("role"),
        created_at: row.get("created_at"),
        last_login_at: row.get("last_login_at"),
    }
}

fn todo_from_row(row: &sqlx::sqlite::SqliteRow) -> Todo {
    let completed: i32 = row.get("completed");
    Todo {
        id: row.get("id"),
        user_id: row.get("user_id"),
        text: row.get("text"),
        todo_type: row.get("type"),
        completed: completed != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn item_from_row(row: &sqlx::sqlite::SqliteRow) -> Item {
    let completed: i32 = row.get("completed");
    let pinned: i32 = row.get("pinned");
    let archived: i32 = row.get("archived");
    let item_type: String = row.get("item_type");
    let priority: Option<String> = row.get("priority");
    Item {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        item_type: crate::models::ItemType::from_str(&item_type).unwrap_or_default(),
        completed: completed != 0,
        priority: priority.as_deref().and_then(Priority::from_str),
        due_date: row.get("due_date"),
        pinned: pinned != 0,
        archived: archived != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn tag_from_row(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        color: row.get("color"),
        created_at: row.get("created_at"),
    }
}

fn product_from_row(row: &sqlx::sqlite::SqliteRow) -> Product {
    let is_active: i32 = row.get("is_active");
    Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        stock: row.get("stock"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        is_active: is_active != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
