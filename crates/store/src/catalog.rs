//! Catalog store operations: suppliers, the category tree, products, images.

use chrono::Utc;

use storefront_catalog::{
    Category, CategoryId, ImageId, Product, ProductId, ProductImage, Supplier, SupplierContact,
    SupplierId,
};
use storefront_core::{Money, RecordId, StoreError, StoreResult};

use crate::tables::Store;

impl Store {
    pub fn create_supplier(&self, name: &str, contact: SupplierContact) -> StoreResult<Supplier> {
        let mut tables = self.write()?;
        let supplier = Supplier::new(SupplierId::new(RecordId::new()), name, contact)?;
        tables.suppliers.insert(supplier.id_typed(), supplier.clone());
        Ok(supplier)
    }

    pub fn get_supplier(&self, supplier_id: SupplierId) -> StoreResult<Supplier> {
        let tables = self.read()?;
        tables
            .suppliers
            .get(&supplier_id)
            .cloned()
            .ok_or(StoreError::not_found("supplier"))
    }

    /// Delete a supplier. Its products stay in the catalog with the supplier
    /// reference nulled; the relationship is not an existence dependency.
    pub fn delete_supplier(&self, supplier_id: SupplierId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.suppliers.remove(&supplier_id).is_none() {
            return Err(StoreError::not_found("supplier"));
        }

        let now = Utc::now();
        let mut detached = 0usize;
        for product in tables.products.values_mut() {
            if product.supplier_id() == Some(supplier_id) {
                product.set_supplier(None, now);
                detached += 1;
            }
        }
        tracing::debug!(%supplier_id, detached, "supplier deleted, products detached");
        Ok(())
    }

    /// Create a category. Name and slug are unique; the parent (when given)
    /// must exist and must not put the new node on its own ancestor chain.
    pub fn create_category(
        &self,
        name: &str,
        slug: &str,
        parent_id: Option<CategoryId>,
    ) -> StoreResult<Category> {
        let mut tables = self.write()?;

        let category = Category::new(CategoryId::new(RecordId::new()), name, slug, parent_id)?;
        if tables.category_names.contains_key(category.name()) {
            return Err(StoreError::duplicate_key("category", category.name()));
        }
        if tables.category_slugs.contains_key(category.slug()) {
            return Err(StoreError::duplicate_key("category", category.slug()));
        }
        if let Some(parent_id) = parent_id {
            if !tables.categories.contains_key(&parent_id) {
                return Err(StoreError::not_found("category"));
            }
        }
        tables.ensure_acyclic(category.id_typed(), parent_id)?;

        tables
            .category_names
            .insert(category.name().to_string(), category.id_typed());
        tables
            .category_slugs
            .insert(category.slug().to_string(), category.id_typed());
        tables.categories.insert(category.id_typed(), category.clone());
        Ok(category)
    }

    pub fn get_category(&self, category_id: CategoryId) -> StoreResult<Category> {
        let tables = self.read()?;
        tables
            .categories
            .get(&category_id)
            .cloned()
            .ok_or(StoreError::not_found("category"))
    }

    /// Reparent a category. This is where cycles actually form, so the
    /// ancestor chain of the new parent is walked before the edge is written.
    pub fn set_category_parent(
        &self,
        category_id: CategoryId,
        parent_id: Option<CategoryId>,
    ) -> StoreResult<Category> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&category_id) {
            return Err(StoreError::not_found("category"));
        }
        if let Some(parent_id) = parent_id {
            if !tables.categories.contains_key(&parent_id) {
                return Err(StoreError::not_found("category"));
            }
        }
        tables.ensure_acyclic(category_id, parent_id)?;

        let Some(category) = tables.categories.get_mut(&category_id) else {
            return Err(StoreError::not_found("category"));
        };
        category.set_parent(parent_id);
        Ok(category.clone())
    }

    /// Delete a leaf category: child categories block the deletion, product
    /// associations are dissolved with it.
    pub fn delete_category(&self, category_id: CategoryId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&category_id) {
            return Err(StoreError::not_found("category"));
        }
        if tables
            .categories
            .values()
            .any(|c| c.parent_id() == Some(category_id))
        {
            return Err(StoreError::constraint(
                "category still has child categories",
            ));
        }

        let tables = &mut *tables;
        let Some(category) = tables.categories.remove(&category_id) else {
            return Err(StoreError::not_found("category"));
        };
        tables.category_names.remove(category.name());
        tables.category_slugs.remove(category.slug());
        tables.product_categories.retain(|(_, c)| *c != category_id);
        Ok(())
    }

    /// Add a product to the catalog. Fails with `DuplicateKey` on an existing
    /// SKU; the supplier, when given, must exist.
    pub fn create_product(
        &self,
        sku: &str,
        name: &str,
        description: Option<&str>,
        price: Money,
        weight_grams: u32,
        supplier_id: Option<SupplierId>,
    ) -> StoreResult<Product> {
        let mut tables = self.write()?;

        let product = Product::new(
            ProductId::new(RecordId::new()),
            sku,
            name,
            description,
            price,
            weight_grams,
            supplier_id,
            Utc::now(),
        )?;
        if tables.skus.contains_key(product.sku()) {
            return Err(StoreError::duplicate_key("product", product.sku()));
        }
        if let Some(supplier_id) = supplier_id {
            if !tables.suppliers.contains_key(&supplier_id) {
                return Err(StoreError::not_found("supplier"));
            }
        }

        tables.skus.insert(product.sku().to_string(), product.id_typed());
        tables.products.insert(product.id_typed(), product.clone());
        Ok(product)
    }

    pub fn get_product(&self, product_id: ProductId) -> StoreResult<Product> {
        let tables = self.read()?;
        tables
            .products
            .get(&product_id)
            .cloned()
            .ok_or(StoreError::not_found("product"))
    }

    /// Reprice a product. Orders that already snapshot the old price are
    /// untouched.
    pub fn update_product_price(&self, product_id: ProductId, price: Money) -> StoreResult<Product> {
        let mut tables = self.write()?;
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or(StoreError::not_found("product"))?;
        product.set_price(price, Utc::now());
        Ok(product.clone())
    }

    pub fn set_product_active(&self, product_id: ProductId, active: bool) -> StoreResult<Product> {
        let mut tables = self.write()?;
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or(StoreError::not_found("product"))?;
        product.set_active(active, Utc::now());
        Ok(product.clone())
    }

    /// Put a product into a category. Membership is a set: attaching an
    /// existing pair is a no-op, not an error.
    pub fn attach_category(&self, product_id: ProductId, category_id: CategoryId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        if !tables.categories.contains_key(&category_id) {
            return Err(StoreError::not_found("category"));
        }
        tables.product_categories.insert((product_id, category_id));
        Ok(())
    }

    /// Remove a product from a category; removing an absent pair is a no-op.
    pub fn detach_category(&self, product_id: ProductId, category_id: CategoryId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        if !tables.categories.contains_key(&category_id) {
            return Err(StoreError::not_found("category"));
        }
        tables.product_categories.remove(&(product_id, category_id));
        Ok(())
    }

    pub fn categories_of(&self, product_id: ProductId) -> StoreResult<Vec<Category>> {
        let tables = self.read()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        let mut categories: Vec<Category> = tables
            .product_categories
            .iter()
            .filter(|(p, _)| *p == product_id)
            .filter_map(|(_, c)| tables.categories.get(c).cloned())
            .collect();
        categories.sort_by(|a, b| a.slug().cmp(b.slug()));
        Ok(categories)
    }

    pub fn add_product_image(
        &self,
        product_id: ProductId,
        url: &str,
        alt_text: Option<&str>,
        sort_order: u32,
    ) -> StoreResult<ProductImage> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }

        let image = ProductImage::new(
            ImageId::new(RecordId::new()),
            product_id,
            url,
            alt_text,
            sort_order,
        )?;
        tables.images.insert(image.id_typed(), image.clone());
        Ok(image)
    }

    pub fn delete_product_image(&self, image_id: ImageId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.images.remove(&image_id).is_none() {
            return Err(StoreError::not_found("image"));
        }
        Ok(())
    }

    /// Images of a product in display order.
    pub fn images_of(&self, product_id: ProductId) -> StoreResult<Vec<ProductImage>> {
        let tables = self.read()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        let mut images: Vec<ProductImage> = tables
            .images
            .values()
            .filter(|i| i.product_id() == product_id)
            .cloned()
            .collect();
        images.sort_by_key(ProductImage::sort_order);
        Ok(images)
    }

    /// Delete a product. Purchase history protects it: any citing order item
    /// blocks the deletion with `ReferencedByOrder` and nothing changes.
    /// Otherwise images, category links, inventory rows, and reviews go with
    /// it in one unit.
    pub fn delete_product(&self, product_id: ProductId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product"));
        }
        if tables
            .orders
            .values()
            .any(|o| o.references_product(product_id))
        {
            return Err(StoreError::referenced_by_order("product"));
        }

        let tables = &mut *tables;
        let Some(product) = tables.products.remove(&product_id) else {
            return Err(StoreError::not_found("product"));
        };
        tables.skus.remove(product.sku());

        let images_before = tables.images.len();
        tables.images.retain(|_, i| i.product_id() != product_id);
        let links_before = tables.product_categories.len();
        tables.product_categories.retain(|(p, _)| *p != product_id);
        let inventory_before = tables.inventory.len();
        tables.inventory.retain(|(p, _), _| *p != product_id);
        let reviews_before = tables.reviews.len();
        tables.reviews.retain(|_, r| r.product_id() != product_id);

        tracing::debug!(
            %product_id,
            removed_images = images_before - tables.images.len(),
            removed_links = links_before - tables.product_categories.len(),
            removed_inventory = inventory_before - tables.inventory.len(),
            removed_reviews = reviews_before - tables.reviews.len(),
            "product deleted with cascade"
        );
        Ok(())
    }
}
