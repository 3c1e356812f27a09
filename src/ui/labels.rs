//! Interface text.
//!
//! Every string the operator reads lives here. Templates receive the table
//! as `labels`; messages with a `{}` slot are filled with [`fill`].

pub struct Labels {
    pub app_title: &'static str,
    pub app_tagline: &'static str,
    pub app_features: [&'static str; 3],

    // Navigation
    pub nav_home: &'static str,
    pub nav_customers: &'static str,
    pub nav_settings: &'static str,
    pub nav_logout: &'static str,

    // Login
    pub login_heading: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub login_button: &'static str,
    pub login_success_title: &'static str,
    pub login_failed_title: &'static str,
    pub welcome_back: &'static str,

    // Dashboard
    pub overview: &'static str,
    pub card_total: &'static str,
    pub card_clean_coal: &'static str,
    pub card_middlings: &'static str,
    pub recent_customers: &'static str,

    // Customer list and forms
    pub customer_management: &'static str,
    pub search: &'static str,
    pub search_button: &'static str,
    pub reset_button: &'static str,
    pub customer_type: &'static str,
    pub add_customer: &'static str,
    pub edit_customer: &'static str,
    pub delete_customer: &'static str,
    pub col_id: &'static str,
    pub company_name: &'static str,
    pub contact_name: &'static str,
    pub phone: &'static str,
    pub notes: &'static str,
    pub registration_date: &'static str,
    pub actions: &'static str,
    pub required_mark: &'static str,
    pub save: &'static str,
    pub cancel: &'static str,
    pub no_customers: &'static str,
    pub confirm_delete_title: &'static str,
    pub confirm_delete_prompt: &'static str,
    pub confirm: &'static str,

    // Settings
    pub system_settings: &'static str,
    pub change_password: &'static str,
    pub current_password: &'static str,
    pub new_password: &'static str,
    pub confirm_password: &'static str,
    pub data_management: &'static str,
    pub backup_database: &'static str,
    pub restore_database: &'static str,
    pub restore_prompt: &'static str,
    pub restore_confirm_title: &'static str,
    pub restore_warning: &'static str,
    pub system_info: &'static str,
    pub info_developer: &'static str,
    pub info_release_date: &'static str,
    pub info_database: &'static str,

    // Notice titles
    pub title_success: &'static str,
    pub title_error: &'static str,
    pub title_hint: &'static str,

    // Notice messages
    pub msg_required_fields: &'static str,
    pub msg_invalid_phone: &'static str,
    pub msg_invalid_type: &'static str,
    pub msg_invalid_credentials: &'static str,
    pub msg_incorrect_password: &'static str,
    pub msg_empty_password: &'static str,
    pub msg_password_mismatch: &'static str,
    pub msg_password_updated: &'static str,
    pub msg_customer_added: &'static str,
    pub msg_customer_updated: &'static str,
    pub msg_customer_deleted: &'static str,
    pub msg_customer_missing: &'static str,
    pub msg_no_backups: &'static str,
    pub msg_backup_not_found: &'static str,
    pub msg_backup_done: &'static str,
    pub msg_restore_done: &'static str,
    pub msg_restore_unconfirmed: &'static str,

    // Failure prefixes for storage errors
    pub fail_generic: &'static str,
    pub fail_delete: &'static str,
    pub fail_backup: &'static str,
    pub fail_restore: &'static str,
}

pub static LABELS: Labels = Labels {
    app_title: "凯川矿客户管理系统",
    app_tagline: "高效管理煤炭行业客户信息",
    app_features: ["客户分类管理", "客户统计分析", "系统安全管理"],

    nav_home: "首页",
    nav_customers: "客户管理",
    nav_settings: "系统设置",
    nav_logout: "退出登录",

    login_heading: "用户登录",
    username: "用户名",
    password: "密码",
    login_button: "登录",
    login_success_title: "登录成功",
    login_failed_title: "登录失败",
    welcome_back: "欢迎回来，{}！",

    overview: "数据概览",
    card_total: "总客户数",
    card_clean_coal: "精煤客户",
    card_middlings: "中煤客户",
    recent_customers: "最近添加的客户",

    customer_management: "客户管理",
    search: "搜索",
    search_button: "搜索",
    reset_button: "重置",
    customer_type: "客户类型",
    add_customer: "添加新客户",
    edit_customer: "编辑客户",
    delete_customer: "删除客户",
    col_id: "ID",
    company_name: "公司名称",
    contact_name: "客户名称",
    phone: "联系电话",
    notes: "备注",
    registration_date: "注册日期",
    actions: "操作",
    required_mark: "*",
    save: "保存",
    cancel: "取消",
    no_customers: "暂无客户",
    confirm_delete_title: "确认删除",
    confirm_delete_prompt: "确定要删除客户 '{}' 吗？",
    confirm: "确定",

    system_settings: "系统设置",
    change_password: "更改管理员密码",
    current_password: "当前密码",
    new_password: "新密码",
    confirm_password: "再次输入新密码",
    data_management: "数据管理",
    backup_database: "备份数据库",
    restore_database: "恢复数据库",
    restore_prompt: "请选择要恢复的备份文件",
    restore_confirm_title: "确认恢复",
    restore_warning: "恢复数据库将覆盖当前数据，是否继续？",
    system_info: "系统信息",
    info_developer: "开发人员: 王杰",
    info_release_date: "开发日期: 2025-06-24",
    info_database: "数据库位置: {}",

    title_success: "成功",
    title_error: "错误",
    title_hint: "提示",

    msg_required_fields: "公司名称、客户名称和联系电话不能为空",
    msg_invalid_phone: "请输入有效的手机号码",
    msg_invalid_type: "请选择有效的客户类型",
    msg_invalid_credentials: "用户名或密码错误",
    msg_incorrect_password: "当前密码不正确",
    msg_empty_password: "新密码不能为空",
    msg_password_mismatch: "两次输入的新密码不一致",
    msg_password_updated: "密码已更新",
    msg_customer_added: "客户添加成功",
    msg_customer_updated: "客户信息更新成功",
    msg_customer_deleted: "客户已删除",
    msg_customer_missing: "未找到该客户",
    msg_no_backups: "没有找到备份文件",
    msg_backup_not_found: "指定的备份文件不存在",
    msg_backup_done: "数据库备份成功，备份文件位于: {}",
    msg_restore_done: "数据库恢复成功",
    msg_restore_unconfirmed: "请先确认恢复操作",

    fail_generic: "操作失败",
    fail_delete: "删除失败",
    fail_backup: "备份失败",
    fail_restore: "恢复失败",
};

/// Substitute the first `{}` in a label
pub fn fill(label: &str, value: &str) -> String {
    label.replacen("{}", value, 1)
}
