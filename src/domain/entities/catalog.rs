use crate::domain::entities::column::{ColumnKind, ColumnSpec};
use crate::domain::entities::entity::{
    DescriptorError, EntityDescriptor, EntityDescriptorBuilder, EntityKind,
};
use crate::domain::entities::list_query::SortDirection;

impl EntityKind {
    pub fn descriptor(self) -> Result<EntityDescriptor, DescriptorError> {
        let builder = EntityDescriptor::builder(self)
            .locked_column("id", "ID")
            .endpoint(self.endpoint());
        let builder = match self {
            EntityKind::Contacts => contacts(builder),
            EntityKind::Developers => developers(builder),
            EntityKind::Owners => owners(builder),
            EntityKind::Inventory => inventory(builder),
            EntityKind::TenancyContracts => tenancy_contracts(builder),
            EntityKind::Properties => properties(builder),
            EntityKind::Projects => projects(builder),
            EntityKind::Reports => reports(builder),
        };
        builder.build()
    }

    /// Backend route of the list, relative to the API base URL.
    fn endpoint(self) -> &'static str {
        match self {
            EntityKind::Contacts => "/contacts",
            EntityKind::Developers => "/developers",
            EntityKind::Owners => "/owners",
            EntityKind::Inventory => "/inventory",
            EntityKind::TenancyContracts => "/tenancy-contracts",
            EntityKind::Properties => "/properties",
            EntityKind::Projects => "/projects",
            EntityKind::Reports => "/reports",
        }
    }
}

fn contacts(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("full_name", "Name"))
        .column(ColumnSpec::new("email", "Email"))
        .column(ColumnSpec::new("phone", "Phone"))
        .column(ColumnSpec::new("company", "Company").hidden_by_default())
        .column(ColumnSpec::new("contact_type", "Type").kind(ColumnKind::Status))
        .column(ColumnSpec::new("created_at", "Created").kind(ColumnKind::Date))
        .sort_option("created_at", "Created")
        .sort_option("full_name", "Name")
        .sort_option("email", "Email")
        .default_sort("created_at", SortDirection::Desc)
}

fn developers(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("name", "Name"))
        .column(ColumnSpec::new("email", "Email"))
        .column(ColumnSpec::new("phone", "Phone"))
        .column(ColumnSpec::new("website", "Website").hidden_by_default())
        .column(ColumnSpec::new("projects_count", "Projects").kind(ColumnKind::Number))
        .column(ColumnSpec::new("created_at", "Created").kind(ColumnKind::Date))
        .sort_option("created_at", "Created")
        .sort_option("name", "Name")
        .sort_option("projects_count", "Projects")
        .default_sort("created_at", SortDirection::Desc)
}

fn owners(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("full_name", "Name"))
        .column(ColumnSpec::new("email", "Email"))
        .column(ColumnSpec::new("phone", "Phone"))
        .column(ColumnSpec::new("nationality", "Nationality").hidden_by_default())
        .column(ColumnSpec::new("properties_count", "Properties").kind(ColumnKind::Number))
        .column(ColumnSpec::new("created_at", "Created").kind(ColumnKind::Date))
        .sort_option("created_at", "Created")
        .sort_option("full_name", "Name")
        .default_sort("created_at", SortDirection::Desc)
}

fn inventory(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("unit_number", "Unit"))
        .column(ColumnSpec::new("property.name", "Property"))
        .column(ColumnSpec::new("unit_type", "Type"))
        .column(ColumnSpec::new("bedrooms", "Bedrooms").kind(ColumnKind::Number))
        .column(ColumnSpec::new("area_sqft", "Area (sqft)").kind(ColumnKind::Number))
        .column(ColumnSpec::new("price", "Price").kind(ColumnKind::Money))
        .column(ColumnSpec::new("status", "Status").kind(ColumnKind::Status))
        .column(
            ColumnSpec::new("created_at", "Created")
                .kind(ColumnKind::Date)
                .hidden_by_default(),
        )
        .sort_option("created_at", "Created")
        .sort_option("unit_number", "Unit")
        .sort_option("price", "Price")
        .default_sort("created_at", SortDirection::Desc)
}

fn tenancy_contracts(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("contract_number", "Contract"))
        .column(ColumnSpec::new("tenant.full_name", "Tenant"))
        .column(ColumnSpec::new("unit.unit_number", "Unit"))
        .column(ColumnSpec::new("start_date", "Start").kind(ColumnKind::Date))
        .column(ColumnSpec::new("end_date", "End").kind(ColumnKind::Date))
        .column(ColumnSpec::new("annual_rent", "Annual Rent").kind(ColumnKind::Money))
        .column(ColumnSpec::new("status", "Status").kind(ColumnKind::Status))
        .sort_option("created_at", "Created")
        .sort_option("start_date", "Start")
        .sort_option("end_date", "End")
        .sort_option("annual_rent", "Annual Rent")
        .default_sort("created_at", SortDirection::Desc)
}

fn properties(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("name", "Name"))
        .column(ColumnSpec::new("property_type", "Type").kind(ColumnKind::Status))
        .column(ColumnSpec::new("city", "City"))
        .column(ColumnSpec::new("owner.full_name", "Owner"))
        .column(ColumnSpec::new("units_count", "Units").kind(ColumnKind::Number))
        .column(ColumnSpec::new("status", "Status").kind(ColumnKind::Status))
        .column(
            ColumnSpec::new("created_at", "Created")
                .kind(ColumnKind::Date)
                .hidden_by_default(),
        )
        .sort_option("created_at", "Created")
        .sort_option("name", "Name")
        .sort_option("city", "City")
        .default_sort("created_at", SortDirection::Desc)
}

fn projects(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("name", "Name"))
        .column(ColumnSpec::new("developer.name", "Developer"))
        .column(ColumnSpec::new("location", "Location"))
        .column(ColumnSpec::new("status", "Status").kind(ColumnKind::Status))
        .column(ColumnSpec::new("completion_date", "Completion").kind(ColumnKind::Date))
        .column(
            ColumnSpec::new("created_at", "Created")
                .kind(ColumnKind::Date)
                .hidden_by_default(),
        )
        .sort_option("created_at", "Created")
        .sort_option("name", "Name")
        .sort_option("completion_date", "Completion")
        .default_sort("created_at", SortDirection::Desc)
}

fn reports(builder: EntityDescriptorBuilder) -> EntityDescriptorBuilder {
    builder
        .column(ColumnSpec::new("title", "Title"))
        .column(ColumnSpec::new("report_type", "Type").kind(ColumnKind::Status))
        .column(ColumnSpec::new("property.name", "Property"))
        .column(ColumnSpec::new("period_start", "From").kind(ColumnKind::Date))
        .column(ColumnSpec::new("period_end", "To").kind(ColumnKind::Date))
        .column(ColumnSpec::new("generated_by.full_name", "Generated By").hidden_by_default())
        .column(ColumnSpec::new("created_at", "Created").kind(ColumnKind::Date))
        .sort_option("created_at", "Created")
        .sort_option("title", "Title")
        .sort_option("period_start", "Period")
        .default_sort("created_at", SortDirection::Desc)
}
